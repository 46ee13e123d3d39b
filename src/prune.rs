use crate::data::{labeled_samples, Observation, Sample};
use crate::errors::TreeError;
use crate::node::Node;
use crate::splitter::split;
use crate::tree::DecisionTree;
use log::{debug, info};

impl DecisionTree {
    /// Remove subtrees which don't generalize to held out data.
    ///
    /// Bottom up reduced error pruning: once both children of a node are
    /// pruned, the node is collapsed into a leaf (majority label of its
    /// training distribution) if that leaf misclassifies no more of the
    /// validation observations reaching the node than the subtree does.
    /// Without validation data the tree is returned unchanged.
    pub fn prune(self, validation: Option<&[Observation]>) -> Result<DecisionTree, TreeError> {
        let validation = match validation {
            Some(v) => v,
            None => return Ok(self),
        };
        let samples = labeled_samples(validation)?;

        let old_n_nodes = self.n_nodes();
        let (root, errors) = prune_node(self.root, &samples)?;
        let tree = DecisionTree::new(root);
        info!(
            "pruning: n_nodes: {} -> {}, validation errors: {} of {}",
            old_n_nodes,
            tree.n_nodes(),
            errors,
            samples.len()
        );
        Ok(tree)
    }
}

/// Prune a subtree, returning it together with the number of `samples` it misclassifies.
fn prune_node(node: Node, samples: &[Sample]) -> Result<(Node, usize), TreeError> {
    match node {
        Node::Leaf { .. } => {
            let errors = errors_predicting(node.majority_label(), samples);
            Ok((node, errors))
        }
        Node::Internal {
            feature_index,
            threshold,
            distribution,
            n,
            at_or_below,
            above,
        } => {
            let (left, right) = split(samples, feature_index, threshold)?;
            let (at_or_below, left_errors) = prune_node(*at_or_below, &left)?;
            let (above, right_errors) = prune_node(*above, &right)?;
            let kept_errors = left_errors + right_errors;

            let leaf_errors = errors_predicting(distribution.majority(), samples);
            let node = Node::Internal {
                feature_index,
                threshold,
                distribution,
                n,
                at_or_below: Box::new(at_or_below),
                above: Box::new(above),
            };
            if leaf_errors <= kept_errors {
                debug!(
                    "collapsing split on feature {} at {} ({} validation observations, errors {} -> {})",
                    feature_index,
                    threshold,
                    samples.len(),
                    kept_errors,
                    leaf_errors
                );
                Ok((node.collapse(), leaf_errors))
            } else {
                Ok((node, kept_errors))
            }
        }
    }
}

/// Misclassifications if `label` were predicted for every sample.
fn errors_predicting(label: Option<&str>, samples: &[Sample]) -> usize {
    samples.iter().filter(|s| Some(s.label) != label).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::LabelDistribution;

    fn stump() -> DecisionTree {
        DecisionTree::new(Node::internal(
            0,
            5.0,
            LabelDistribution::from_labels(["A", "A", "B", "B", "B"]),
            Node::leaf(LabelDistribution::from_labels(["A", "A"])),
            Node::leaf(LabelDistribution::from_labels(["B", "B", "B"])),
        ))
    }

    #[test]
    fn test_prune_without_validation() {
        let pruned = stump().prune(None).unwrap();
        assert_eq!(pruned, stump());
    }

    #[test]
    fn test_prune_keeps_useful_split() {
        let validation = vec![
            Observation::labeled(vec![1.0], "A"),
            Observation::labeled(vec![9.0], "B"),
        ];
        let pruned = stump().prune(Some(&validation)).unwrap();
        assert_eq!(pruned, stump());
    }

    #[test]
    fn test_prune_collapses_on_tie() {
        // The split and the majority leaf both get the "C" wrong.
        let validation = vec![
            Observation::labeled(vec![1.0], "C"),
            Observation::labeled(vec![9.0], "B"),
        ];
        let pruned = stump().prune(Some(&validation)).unwrap();
        assert!(pruned.root().is_leaf());
        assert_eq!(pruned.root().n(), 5);
        assert_eq!(pruned.predict_row(&[1.0]).unwrap(), "B");
    }

    #[test]
    fn test_prune_collapses_unvisited_subtrees() {
        let root = Node::internal(
            0,
            5.0,
            LabelDistribution::from_labels(["A", "A", "A", "B", "B"]),
            Node::leaf(LabelDistribution::from_labels(["A", "A", "A"])),
            Node::internal(
                1,
                0.5,
                LabelDistribution::from_labels(["B", "B"]),
                Node::leaf(LabelDistribution::from_labels(["B"])),
                Node::leaf(LabelDistribution::from_labels(["B"])),
            ),
        );
        // Only the left side sees validation data.
        let validation = vec![Observation::labeled(vec![1.0, 0.0], "A")];
        let pruned = DecisionTree::new(root).prune(Some(&validation)).unwrap();
        assert!(pruned.root().is_leaf());
        assert_eq!(pruned.predict_row(&[9.0, 0.0]).unwrap(), "A");
    }

    #[test]
    fn test_prune_requires_labels() {
        let validation = vec![Observation::unlabeled(vec![1.0])];
        assert!(matches!(
            stump().prune(Some(&validation)),
            Err(TreeError::MissingLabel(0))
        ));
    }
}
