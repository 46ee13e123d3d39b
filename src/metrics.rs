//! Metrics
//!
//! Scores of a fitted tree against labeled observations.
use crate::data::{labeled_samples, Observation};
use crate::errors::TreeError;
use crate::tree::DecisionTree;

/// Number of labeled observations whose predicted label differs from the true one.
pub fn misclassified(tree: &DecisionTree, observations: &[Observation]) -> Result<usize, TreeError> {
    let samples = labeled_samples(observations)?;
    let mut errors = 0;
    for sample in samples.iter() {
        if tree.predict_row(sample.features)? != sample.label {
            errors += 1;
        }
    }
    Ok(errors)
}

/// Fraction of observations predicted correctly, `None` for an empty set.
pub fn accuracy(tree: &DecisionTree, observations: &[Observation]) -> Result<Option<f64>, TreeError> {
    if observations.is_empty() {
        return Ok(None);
    }
    let errors = misclassified(tree, observations)?;
    let n = observations.len() as f64;
    Ok(Some((n - errors as f64) / n))
}
