//! Errors
//!
//! Custom error types used throughout the `dtree` crate.
use thiserror::Error;

/// Errors that can occur while parsing data, growing, pruning,
/// persisting or querying a decision tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A record could not be parsed, first value is the 1-based line number.
    #[error("Malformed record on line {0}: {1}")]
    Format(usize, String),
    /// Training was requested on zero observations.
    #[error("Cannot build a tree from an empty set of observations.")]
    EmptyDataset,
    /// A chosen split left one side empty.
    #[error("Split on feature {0} at threshold {1} produced an empty side.")]
    InvalidSplit(usize, f64),
    /// The persisted model could not be reconstructed.
    #[error("Unable to load model: {0}")]
    ModelLoad(String),
    /// First value is the feature index required, second is the number of features provided.
    #[error("Observation has {1} features, but the tree needs feature index {0}.")]
    PredictionInput(usize, usize),
    /// Observation at this position has no label, but one is required.
    #[error("Observation {0} has no label, labels are required for training and pruning.")]
    MissingLabel(usize),
    /// First value is the observation position, second is expected feature count, third is what was found.
    #[error("Observation {0} has {2} features, expected {1}.")]
    InconsistentFeatures(usize, usize, usize),
    /// First value is the observation position, second is the feature index.
    #[error("Observation {0} has a NaN value for feature {1}.")]
    InvalidFeatureValue(usize, usize),
    /// Unable to write model or data.
    #[error("Unable to write: {0}")]
    UnableToWrite(String),
    /// Unable to read model or data.
    #[error("Unable to read: {0}")]
    UnableToRead(String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
}
