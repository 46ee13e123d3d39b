//! Model persistence
//!
//! The text model format is a preorder listing of the nodes, one record per
//! line:
//!
//! ```text
//! N <feature_index> <threshold> <n> <k> <label> <count> ... (k pairs)
//! L <n> <k> <label> <count> ... (k pairs)
//! ```
//!
//! An internal record is followed by the record of its `at_or_below`
//! child and then the record of its `above` child. Labels are written as
//! JSON string literals so any label survives the round trip. Thresholds
//! use the shortest decimal text that parses back to the same `f64`.
use crate::config::JsonIO;
use crate::constants::{INTERNAL_TAG, LEAF_TAG};
use crate::distribution::LabelDistribution;
use crate::errors::TreeError;
use crate::node::{Node, NodeRecord, PreorderBuilder};
use crate::tree::DecisionTree;
use crate::utils::items_to_strings;
use log::debug;
use std::fmt::Write as FmtWrite;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// On-disk representation of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFormat {
    /// Preorder node records.
    #[default]
    Text,
    /// The serde representation of the whole tree.
    Json,
}

impl FromStr for ModelFormat {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ModelFormat::Text),
            "json" => Ok(ModelFormat::Json),
            _ => Err(TreeError::InvalidParameter(
                "format".to_string(),
                items_to_strings(vec!["text", "json"]),
                s.to_string(),
            )),
        }
    }
}

/// Encode a subtree in the text model format.
pub fn to_text(node: &Node) -> String {
    let mut out = String::new();
    for node in node.preorder() {
        write_record(node, &mut out);
    }
    out
}

fn write_record(node: &Node, out: &mut String) {
    match node {
        Node::Leaf { distribution, n } => {
            out.push_str(LEAF_TAG);
            let _ = write!(out, " {}", n);
            write_distribution(distribution, out);
        }
        Node::Internal {
            feature_index,
            threshold,
            distribution,
            n,
            ..
        } => {
            out.push_str(INTERNAL_TAG);
            let _ = write!(out, " {} {:?} {}", feature_index, threshold, n);
            write_distribution(distribution, out);
        }
    }
    out.push('\n');
}

fn write_distribution(distribution: &LabelDistribution, out: &mut String) {
    let _ = write!(out, " {}", distribution.n_labels());
    for (label, count) in distribution.iter() {
        // Serializing a str to JSON cannot fail.
        let quoted = serde_json::to_string(label).unwrap_or_default();
        let _ = write!(out, " {} {}", quoted, count);
    }
}

/// Write a subtree in the text model format.
pub fn save<W: Write>(node: &Node, mut writer: W) -> Result<(), TreeError> {
    writer
        .write_all(to_text(node).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| TreeError::UnableToWrite(e.to_string()))
}

/// Decode a subtree from the text model format.
///
/// The whole input has to be exactly one well-formed tree, anything
/// truncated, malformed, trailing or nested deeper than
/// [`MAX_TREE_DEPTH`](crate::constants::MAX_TREE_DEPTH) fails without
/// returning a partial tree.
pub fn from_text(text: &str) -> Result<Node, TreeError> {
    let mut tokens = Tokens::new(text);
    let mut builder = PreorderBuilder::new();
    let root = loop {
        let record = parse_record(&mut tokens)?;
        if let Some(root) = builder.push(record)? {
            break root;
        }
    };
    if let Some(token) = tokens.next_token()? {
        return Err(TreeError::ModelLoad(format!(
            "unexpected data after the last node: {:?}",
            token.as_str()
        )));
    }
    root.check_invariants()?;
    Ok(root)
}

/// Read a subtree in the text model format.
pub fn load<R: Read>(mut reader: R) -> Result<Node, TreeError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| TreeError::UnableToRead(e.to_string()))?;
    from_text(&text)
}

fn parse_record(tokens: &mut Tokens) -> Result<NodeRecord, TreeError> {
    let tag = tokens.expect_bare("node tag")?;
    match tag {
        LEAF_TAG => {
            let n = tokens.expect_usize("leaf count")?;
            let distribution = parse_distribution(tokens, n)?;
            Ok(NodeRecord::Leaf { distribution, n })
        }
        INTERNAL_TAG => {
            let feature_index = tokens.expect_usize("feature index")?;
            let threshold = tokens.expect_f64("threshold")?;
            let n = tokens.expect_usize("node count")?;
            let distribution = parse_distribution(tokens, n)?;
            Ok(NodeRecord::Internal {
                feature_index,
                threshold,
                distribution,
                n,
            })
        }
        other => Err(TreeError::ModelLoad(format!("unrecognized node tag {:?}", other))),
    }
}

fn parse_distribution(tokens: &mut Tokens, n: usize) -> Result<LabelDistribution, TreeError> {
    let k = tokens.expect_usize("number of labels")?;
    let mut pairs = Vec::with_capacity(k);
    for _ in 0..k {
        let label = tokens.expect_label()?;
        let count = tokens.expect_usize("label count")?;
        pairs.push((label, count));
    }
    let distribution = LabelDistribution::from_pairs(pairs);
    if distribution.n_labels() != k {
        return Err(TreeError::ModelLoad("label listed twice in one distribution".to_string()));
    }
    if distribution.total() != n {
        return Err(TreeError::ModelLoad(format!(
            "label counts sum to {}, but n is {}",
            distribution.total(),
            n
        )));
    }
    Ok(distribution)
}

enum Token<'a> {
    Bare(&'a str),
    Quoted(String),
}

impl<'a> Token<'a> {
    fn as_str(&self) -> &str {
        match self {
            Token::Bare(s) => s,
            Token::Quoted(s) => s,
        }
    }
}

/// Whitespace separated tokens, where a token starting with `"` runs to
/// the matching unescaped quote.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens { text, pos: 0 }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, TreeError> {
        let text = self.text;
        let rest = &text[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if trimmed.starts_with('"') {
            let mut escaped = false;
            let mut end = None;
            for (i, c) in trimmed.char_indices().skip(1) {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => {
                        end = Some(i + 1);
                        break;
                    }
                    _ => {}
                }
            }
            let end = end.ok_or_else(|| TreeError::ModelLoad("unterminated label".to_string()))?;
            let literal = &trimmed[..end];
            self.pos += end;
            let label = serde_json::from_str::<String>(literal)
                .map_err(|e| TreeError::ModelLoad(format!("bad label {}: {}", literal, e)))?;
            Ok(Some(Token::Quoted(label)))
        } else {
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            self.pos += end;
            Ok(Some(Token::Bare(&trimmed[..end])))
        }
    }

    fn expect(&mut self, what: &str) -> Result<Token<'a>, TreeError> {
        self.next_token()?
            .ok_or_else(|| TreeError::ModelLoad(format!("model ends before the {}", what)))
    }

    fn expect_bare(&mut self, what: &str) -> Result<&'a str, TreeError> {
        match self.expect(what)? {
            Token::Bare(s) => Ok(s),
            Token::Quoted(s) => Err(TreeError::ModelLoad(format!("expected the {}, found label {:?}", what, s))),
        }
    }

    fn expect_usize(&mut self, what: &str) -> Result<usize, TreeError> {
        let token = self.expect_bare(what)?;
        token
            .parse::<usize>()
            .map_err(|_| TreeError::ModelLoad(format!("{} {:?} is not a non-negative integer", what, token)))
    }

    fn expect_f64(&mut self, what: &str) -> Result<f64, TreeError> {
        let token = self.expect_bare(what)?;
        match token.parse::<f64>() {
            Ok(v) if !v.is_nan() => Ok(v),
            _ => Err(TreeError::ModelLoad(format!("{} {:?} is not a number", what, token))),
        }
    }

    fn expect_label(&mut self) -> Result<String, TreeError> {
        match self.expect("label")? {
            Token::Quoted(s) => Ok(s),
            Token::Bare(s) => Err(TreeError::ModelLoad(format!("expected a quoted label, found {:?}", s))),
        }
    }
}

impl DecisionTree {
    /// Dump the tree in the text model format.
    pub fn dump(&self) -> String {
        to_text(&self.root)
    }

    /// Load a tree from the text model format.
    pub fn from_dump(text: &str) -> Result<Self, TreeError> {
        from_text(text).map(DecisionTree::new)
    }

    /// Save the tree to a file.
    ///
    /// * `path` - Path to save the model to.
    /// * `format` - Text or json.
    pub fn save_model<P: AsRef<Path>>(&self, path: P, format: ModelFormat) -> Result<(), TreeError> {
        let path = path.as_ref();
        let unable_to_write = |e: std::io::Error| TreeError::UnableToWrite(format!("{}: {}", path.display(), e));
        match format {
            ModelFormat::Text => {
                let file = File::create(path).map_err(unable_to_write)?;
                save(&self.root, BufWriter::new(file))?;
            }
            ModelFormat::Json => fs::write(path, self.json_dump()?).map_err(unable_to_write)?,
        }
        debug!("saved {} node model to {}", self.n_nodes(), path.display());
        Ok(())
    }

    /// Load a tree from a file written by [`DecisionTree::save_model`].
    pub fn load_model<P: AsRef<Path>>(path: P, format: ModelFormat) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let unable_to_read = |e: std::io::Error| TreeError::UnableToRead(format!("{}: {}", path.display(), e));
        let tree = match format {
            ModelFormat::Text => {
                let file = File::open(path).map_err(unable_to_read)?;
                DecisionTree::new(load(BufReader::new(file))?)
            }
            ModelFormat::Json => Self::from_json(&fs::read_to_string(path).map_err(unable_to_read)?)?,
        };
        debug!("loaded {} node model from {}", tree.n_nodes(), path.display());
        Ok(tree)
    }
}
