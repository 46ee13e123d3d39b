use super::tree::DecisionTree;
use crate::data::Observation;
use crate::errors::TreeError;
use crate::node::Node;

impl DecisionTree {
    /// Predict the label of a single observation. Its label, if any, is ignored.
    pub fn predict(&self, observation: &Observation) -> Result<&str, TreeError> {
        predict_row(&self.root, &observation.features)
    }

    /// Predict the label for a row of feature values.
    pub fn predict_row(&self, features: &[f64]) -> Result<&str, TreeError> {
        predict_row(&self.root, features)
    }

    /// Predict every observation, failing on the first malformed one.
    pub fn predict_all(&self, observations: &[Observation]) -> Result<Vec<&str>, TreeError> {
        observations.iter().map(|obs| self.predict(obs)).collect()
    }
}

/// Route a row from `node` down to a leaf and return that leaf's majority label.
pub fn predict_row<'a>(node: &'a Node, features: &[f64]) -> Result<&'a str, TreeError> {
    let mut node = node;
    while let Some(child) = node.child_for(features)? {
        node = child;
    }
    node.majority_label()
        .ok_or_else(|| TreeError::ModelLoad("leaf without any labels".to_string()))
}
