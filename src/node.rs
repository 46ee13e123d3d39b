use crate::constants::MAX_TREE_DEPTH;
use crate::distribution::LabelDistribution;
use crate::errors::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of a binary classification tree.
///
/// Children are owned by their parent, dropping the root drops the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Terminal node, predicts the majority label of its distribution.
    Leaf {
        distribution: LabelDistribution,
        n: usize,
    },
    /// Decision node. Observations with `features[feature_index] <= threshold`
    /// are routed to `at_or_below`, all others to `above`.
    Internal {
        feature_index: usize,
        threshold: f64,
        distribution: LabelDistribution,
        n: usize,
        at_or_below: Box<Node>,
        above: Box<Node>,
    },
}

impl Node {
    /// Create a leaf, `n` is the distribution's total.
    pub fn leaf(distribution: LabelDistribution) -> Self {
        let n = distribution.total();
        Node::Leaf { distribution, n }
    }

    /// Create an internal node, `n` is the distribution's total.
    pub fn internal(
        feature_index: usize,
        threshold: f64,
        distribution: LabelDistribution,
        at_or_below: Node,
        above: Node,
    ) -> Self {
        let n = distribution.total();
        Node::Internal {
            feature_index,
            threshold,
            distribution,
            n,
            at_or_below: Box::new(at_or_below),
            above: Box::new(above),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Label counts of the training observations that reached this node.
    pub fn distribution(&self) -> &LabelDistribution {
        match self {
            Node::Leaf { distribution, .. } | Node::Internal { distribution, .. } => distribution,
        }
    }

    /// Number of training observations that reached this node.
    pub fn n(&self) -> usize {
        match self {
            Node::Leaf { n, .. } | Node::Internal { n, .. } => *n,
        }
    }

    /// Majority label of the training distribution, ties go to the
    /// lexicographically smallest label.
    pub fn majority_label(&self) -> Option<&str> {
        self.distribution().majority()
    }

    /// Replace this subtree by a leaf carrying the same training distribution.
    pub fn collapse(self) -> Node {
        match self {
            Node::Leaf { .. } => self,
            Node::Internal { distribution, n, .. } => Node::Leaf { distribution, n },
        }
    }

    /// The child a row of feature values is routed to, `None` at a leaf.
    pub fn child_for(&self, features: &[f64]) -> Result<Option<&Node>, TreeError> {
        match self {
            Node::Leaf { .. } => Ok(None),
            Node::Internal {
                feature_index,
                threshold,
                at_or_below,
                above,
                ..
            } => {
                let value = features
                    .get(*feature_index)
                    .ok_or(TreeError::PredictionInput(*feature_index, features.len()))?;
                if *value <= *threshold {
                    Ok(Some(at_or_below.as_ref()))
                } else {
                    Ok(Some(above.as_ref()))
                }
            }
        }
    }

    /// Iterate over this subtree in preorder: a node, then its
    /// `at_or_below` subtree, then its `above` subtree.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Total number of nodes in this subtree.
    pub fn n_nodes(&self) -> usize {
        self.preorder().count()
    }

    /// Number of leaves in this subtree.
    pub fn n_leaves(&self) -> usize {
        self.preorder().filter(|node| node.is_leaf()).count()
    }

    /// Length of the longest root to leaf path, a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Internal { at_or_below, above, .. } = node {
                stack.push((at_or_below.as_ref(), depth + 1));
                stack.push((above.as_ref(), depth + 1));
            }
        }
        deepest
    }

    /// Check the invariants a deserialized subtree has to satisfy: every
    /// node has a non-empty distribution of positive counts summing to `n`,
    /// and thresholds are not NaN.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        for node in self.preorder() {
            let (distribution, n) = (node.distribution(), node.n());
            if distribution.is_empty() {
                return Err(TreeError::ModelLoad("node with an empty label distribution".to_string()));
            }
            if distribution.counts().any(|c| c == 0) {
                return Err(TreeError::ModelLoad("label distribution with a zero count".to_string()));
            }
            if distribution.total() != n {
                return Err(TreeError::ModelLoad(format!(
                    "label counts sum to {}, but n is {}",
                    distribution.total(),
                    n
                )));
            }
            if let Node::Internal { threshold, .. } = node {
                if threshold.is_nan() {
                    return Err(TreeError::ModelLoad("threshold is NaN".to_string()));
                }
            }
        }
        Ok(())
    }

    /// The flat preorder records of this subtree.
    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.preorder().map(NodeRecord::from).collect()
    }

    /// Assemble a subtree from exactly one tree's worth of preorder records.
    pub fn from_records<I>(records: I) -> Result<Node, TreeError>
    where
        I: IntoIterator<Item = NodeRecord>,
    {
        let mut builder = PreorderBuilder::new();
        let mut records = records.into_iter();
        for record in records.by_ref() {
            if let Some(root) = builder.push(record)? {
                if records.next().is_some() {
                    return Err(TreeError::ModelLoad("unexpected records after the last node".to_string()));
                }
                return Ok(root);
            }
        }
        Err(TreeError::ModelLoad(format!(
            "model ends before the tree is complete, {} internal nodes are missing children",
            builder.pending()
        )))
    }
}

/// Preorder walk over a subtree, see [`Node::preorder`].
pub struct Preorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Node::Internal { at_or_below, above, .. } = node {
            self.stack.push(above.as_ref());
            self.stack.push(at_or_below.as_ref());
        }
        Some(node)
    }
}

/// A node without its children, the unit of the persisted formats.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum NodeRecord {
    Leaf {
        distribution: LabelDistribution,
        n: usize,
    },
    /// Followed by the records of the `at_or_below` and then the `above` subtree.
    Internal {
        feature_index: usize,
        threshold: f64,
        distribution: LabelDistribution,
        n: usize,
    },
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        match node {
            Node::Leaf { distribution, n } => NodeRecord::Leaf {
                distribution: distribution.clone(),
                n: *n,
            },
            Node::Internal {
                feature_index,
                threshold,
                distribution,
                n,
                ..
            } => NodeRecord::Internal {
                feature_index: *feature_index,
                threshold: *threshold,
                distribution: distribution.clone(),
                n: *n,
            },
        }
    }
}

struct PendingNode {
    feature_index: usize,
    threshold: f64,
    distribution: LabelDistribution,
    n: usize,
    at_or_below: Option<Node>,
}

/// Rebuilds a tree from preorder records, one record at a time, keeping the
/// internal nodes still waiting for children on an explicit stack.
#[derive(Default)]
pub struct PreorderBuilder {
    pending: Vec<PendingNode>,
}

impl PreorderBuilder {
    pub fn new() -> Self {
        PreorderBuilder::default()
    }

    /// Number of internal nodes still waiting for a child.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Add the next record, returns the root once the tree is complete.
    ///
    /// Internal nodes deeper than [`MAX_TREE_DEPTH`] are rejected.
    pub fn push(&mut self, record: NodeRecord) -> Result<Option<Node>, TreeError> {
        let mut node = match record {
            NodeRecord::Leaf { distribution, n } => Node::Leaf { distribution, n },
            NodeRecord::Internal {
                feature_index,
                threshold,
                distribution,
                n,
            } => {
                if self.pending.len() >= MAX_TREE_DEPTH {
                    return Err(TreeError::ModelLoad(format!(
                        "tree is deeper than the supported {} levels",
                        MAX_TREE_DEPTH
                    )));
                }
                self.pending.push(PendingNode {
                    feature_index,
                    threshold,
                    distribution,
                    n,
                    at_or_below: None,
                });
                return Ok(None);
            }
        };

        // Attach the finished subtree to its parent, completing parents
        // whose second child it is.
        while let Some(mut parent) = self.pending.pop() {
            match parent.at_or_below.take() {
                None => {
                    parent.at_or_below = Some(node);
                    self.pending.push(parent);
                    return Ok(None);
                }
                Some(at_or_below) => {
                    node = Node::Internal {
                        feature_index: parent.feature_index,
                        threshold: parent.threshold,
                        distribution: parent.distribution,
                        n: parent.n,
                        at_or_below: Box::new(at_or_below),
                        above: Box::new(node),
                    };
                }
            }
        }
        Ok(Some(node))
    }
}

impl Node {
    fn fmt_indented(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node {
                Node::Leaf { distribution, n } => writeln!(
                    f,
                    "{}leaf n={} {} -> {}",
                    indent,
                    n,
                    distribution,
                    node.majority_label().unwrap_or("?")
                )?,
                Node::Internal {
                    feature_index,
                    threshold,
                    distribution,
                    n,
                    at_or_below,
                    above,
                } => {
                    writeln!(f, "{}[f{} <= {}] n={} {}", indent, feature_index, threshold, n, distribution)?;
                    stack.push((above.as_ref(), depth + 1));
                    stack.push((at_or_below.as_ref(), depth + 1));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    /// One node per line, children indented below their parent,
    /// the `at_or_below` child first.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f)
    }
}
