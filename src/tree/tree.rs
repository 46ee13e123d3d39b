use crate::config::{JsonIO, TreeConfig};
use crate::constants::MAX_TREE_DEPTH;
use crate::data::{labeled_samples, Observation, Sample};
use crate::distribution::LabelDistribution;
use crate::errors::TreeError;
use crate::node::{Node, NodeRecord};
use crate::splitter::{split, ExhaustiveSplitter, SplitCandidate, Splitter};
use crate::utils::{validate_feature_counts, validate_feature_values};
use log::{info, trace};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::{self, Display};

/// A fitted classification tree.
///
/// The tree owns its root node, and through it every other node. Its serde
/// representation is the flat preorder list of [`TreeRecords`], so the
/// nesting of the serialized form does not grow with the depth of the tree.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "TreeRecords")]
pub struct DecisionTree {
    pub root: Node,
}

/// Serialized form of a [`DecisionTree`].
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TreeRecords {
    pub nodes: Vec<NodeRecord>,
}

impl TryFrom<TreeRecords> for DecisionTree {
    type Error = TreeError;

    fn try_from(records: TreeRecords) -> Result<Self, Self::Error> {
        Node::from_records(records.nodes).map(DecisionTree::new)
    }
}

impl Serialize for DecisionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TreeRecords {
            nodes: self.root.to_records(),
        }
        .serialize(serializer)
    }
}

impl DecisionTree {
    pub fn new(root: Node) -> Self {
        DecisionTree { root }
    }

    /// Grow a tree on labeled observations, without pruning.
    ///
    /// Nodes at depth [`MAX_TREE_DEPTH`] always become leaves, whatever
    /// `config.max_depth` says.
    ///
    /// * `observations` - Training data, every observation needs a label and
    ///   the same number of features, none of them NaN.
    /// * `config` - Growth parameters.
    pub fn fit(observations: &[Observation], config: &TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;
        let n_features = validate_feature_counts(observations)?;
        validate_feature_values(observations)?;
        let samples = labeled_samples(observations)?;

        let splitter = ExhaustiveSplitter::new(config.criterion);
        let root = TreeBuilder::new(&splitter, config, n_features).build(&samples)?;
        let tree = DecisionTree::new(root);
        info!(
            "Grew tree on {} observations: {} nodes, {} leaves, depth {}",
            samples.len(),
            tree.n_nodes(),
            tree.n_leaves(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Grow a tree and then prune it against held out observations.
    /// Without a validation set this is the same as [`DecisionTree::fit`].
    pub fn train(
        observations: &[Observation],
        validation: Option<&[Observation]>,
        config: &TreeConfig,
    ) -> Result<Self, TreeError> {
        Self::fit(observations, config)?.prune(validation)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Indices of the features used by at least one split, ascending.
    pub fn features(&self) -> Vec<usize> {
        let mut used = BTreeSet::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Node::Internal {
                feature_index,
                at_or_below,
                above,
                ..
            } = node
            {
                used.insert(*feature_index);
                stack.push(at_or_below);
                stack.push(above);
            }
        }
        used.into_iter().collect()
    }
}

impl JsonIO for DecisionTree {
    fn check_loaded(&self) -> Result<(), TreeError> {
        self.root.check_invariants()
    }

    /// Load from a json string, a node list that isn't exactly one tree is
    /// reported as [`TreeError::ModelLoad`].
    fn from_json(json_str: &str) -> Result<Self, TreeError> {
        let records =
            serde_json::from_str::<TreeRecords>(json_str).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        let tree = DecisionTree::try_from(records)?;
        tree.check_loaded()?;
        Ok(tree)
    }
}

impl Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Grows a tree top down, choosing the best split at every node.
///
/// Growth recurses once per level, and stops at [`MAX_TREE_DEPTH`] at the
/// latest. Use `TreeConfig::max_depth` to grow shallower trees.
pub struct TreeBuilder<'a, T: Splitter> {
    splitter: &'a T,
    config: &'a TreeConfig,
    n_features: usize,
}

impl<'a, T: Splitter> TreeBuilder<'a, T> {
    pub fn new(splitter: &'a T, config: &'a TreeConfig, n_features: usize) -> Self {
        TreeBuilder {
            splitter,
            config,
            n_features,
        }
    }

    /// Build the subtree for a non-empty set of samples.
    pub fn build(&self, samples: &[Sample]) -> Result<Node, TreeError> {
        self.build_node(samples, 0)
    }

    fn build_node(&self, samples: &[Sample], depth: usize) -> Result<Node, TreeError> {
        if samples.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let distribution = LabelDistribution::from_samples(samples);

        if distribution.is_pure() || self.reached_limit(samples.len(), depth) {
            return Ok(Node::leaf(distribution));
        }

        let best = match self.splitter.best_split(samples, self.n_features)? {
            Some(c) if self.accepts(&c) => c,
            _ => return Ok(Node::leaf(distribution)),
        };

        let (left, right) = split(samples, best.feature_index, best.threshold)?;
        if left.is_empty() || right.is_empty() {
            return Err(TreeError::InvalidSplit(best.feature_index, best.threshold));
        }
        trace!(
            "depth {}: split {} observations on feature {} at {} (score {:.6}) into {} / {}",
            depth,
            samples.len(),
            best.feature_index,
            best.threshold,
            best.score,
            left.len(),
            right.len()
        );

        let at_or_below = self.build_node(&left, depth + 1)?;
        let above = self.build_node(&right, depth + 1)?;
        Ok(Node::internal(
            best.feature_index,
            best.threshold,
            distribution,
            at_or_below,
            above,
        ))
    }

    fn reached_limit(&self, n_samples: usize, depth: usize) -> bool {
        n_samples < self.config.min_samples_split
            || depth >= MAX_TREE_DEPTH
            || self.config.max_depth.map(|max| depth >= max).unwrap_or(false)
    }

    fn accepts(&self, candidate: &SplitCandidate) -> bool {
        candidate.is_useful() && candidate.score > self.config.min_gain
    }
}
