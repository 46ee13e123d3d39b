mod prune;

// Modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod data;
pub mod distribution;
pub mod errors;
pub mod impurity;
pub mod metrics;
pub mod node;
pub mod serialize;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use config::{JsonIO, TreeConfig};
pub use data::{Dataset, Observation};
pub use distribution::LabelDistribution;
pub use errors::TreeError;
pub use impurity::SplitCriterion;
pub use node::Node;
pub use serialize::ModelFormat;
pub use tree::DecisionTree;
