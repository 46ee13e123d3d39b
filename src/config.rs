//! Tree Configuration
//!
//! Parameters controlling how a tree is grown, and the JSON persistence
//! shared by the configuration and fitted models.
use crate::constants::MIN_SAMPLES_SPLIT;
use crate::errors::TreeError;
use crate::impurity::SplitCriterion;
use crate::utils::{validate_min_usize_parameter, validate_positive_float_parameter};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_min_samples_split() -> usize {
    MIN_SAMPLES_SPLIT
}

/// Configuration for growing a `DecisionTree`.
///
/// With the defaults a node only becomes a leaf when it is pure or when
/// no split improves purity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Impurity measure splits are scored with.
    #[serde(default)]
    pub criterion: SplitCriterion,
    /// Nodes at this depth become leaves, the root is at depth 0.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Nodes with fewer observations than this become leaves.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// The best split must score above this to be used.
    #[serde(default)]
    pub min_gain: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            criterion: SplitCriterion::Entropy,
            max_depth: None,
            min_samples_split: MIN_SAMPLES_SPLIT,
            min_gain: 0.0,
        }
    }
}

impl TreeConfig {
    // Set methods for paramters

    /// Set the impurity measure.
    /// * `criterion` - Entropy (information gain) or Gini.
    pub fn set_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum depth.
    /// * `max_depth` - Depth at which nodes are forced to be leaves, `None` for unlimited.
    pub fn set_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of observations needed to attempt a split.
    pub fn set_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum gain.
    /// * `min_gain` - Splits scoring at or below this are not used.
    pub fn set_min_gain(mut self, min_gain: f64) -> Self {
        self.min_gain = min_gain;
        self
    }

    /// Check that all parameters are within their valid ranges.
    pub fn validate(&self) -> Result<(), TreeError> {
        validate_min_usize_parameter(self.min_samples_split, 2, "min_samples_split")?;
        validate_positive_float_parameter(self.min_gain, "min_gain")?;
        Ok(())
    }
}

/// JSON persistence.
pub trait JsonIO: Serialize + DeserializeOwned + Sized {
    /// Hook run after deserializing, to reject values that parse but are invalid.
    fn check_loaded(&self) -> Result<(), TreeError> {
        Ok(())
    }

    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        fs::write(path, self.json_dump()?).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object.
    fn json_dump(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string.
    ///
    /// * `json_str` - String object, which can be deserialized from json.
    fn from_json(json_str: &str) -> Result<Self, TreeError> {
        let value = serde_json::from_str::<Self>(json_str).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        value.check_loaded()?;
        Ok(value)
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, TreeError> {
        let json_str = fs::read_to_string(path).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl JsonIO for TreeConfig {
    fn check_loaded(&self) -> Result<(), TreeError> {
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tree_config_default() {
        let config = TreeConfig::default();
        assert_eq!(config.criterion, SplitCriterion::Entropy);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.min_samples_split, 2);
        assert_eq!(config.min_gain, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setters() {
        let config = TreeConfig::default()
            .set_criterion(SplitCriterion::Gini)
            .set_max_depth(Some(3))
            .set_min_samples_split(5)
            .set_min_gain(0.01);
        assert_eq!(config.criterion, SplitCriterion::Gini);
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.min_samples_split, 5);
        assert_eq!(config.min_gain, 0.01);
    }

    #[test]
    fn test_validate() {
        assert!(TreeConfig::default().set_min_samples_split(1).validate().is_err());
        assert!(TreeConfig::default().set_min_gain(-1.0).validate().is_err());
        assert!(TreeConfig::default().set_min_gain(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_config_io_json() {
        let config = TreeConfig::default().set_max_depth(Some(4));
        let json = config.json_dump().unwrap();
        let config2 = TreeConfig::from_json(&json).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_config_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        let config = TreeConfig::default().set_criterion(SplitCriterion::Gini);
        config.save_json(&file_path).unwrap();
        let config2 = TreeConfig::load_json(&file_path).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TreeConfig::from_json(r#"{"criterion": "Gini"}"#).unwrap();
        assert_eq!(config.criterion, SplitCriterion::Gini);
        assert_eq!(config.min_samples_split, 2);

        assert!(matches!(
            TreeConfig::from_json(r#"{"min_samples_split": 0}"#),
            Err(TreeError::InvalidParameter(..))
        ));
    }
}
