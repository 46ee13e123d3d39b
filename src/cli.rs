//! Command line interface
//!
//! ```bash
//! dtree train train.csv model.txt --validation validation.csv
//! dtree predict test.csv model.txt > predictions.csv
//! RUST_LOG=debug dtree train train.csv model.json --format json --max-depth 8
//! ```
use crate::config::{JsonIO, TreeConfig};
use crate::data::Dataset;
use crate::errors::TreeError;
use crate::impurity::SplitCriterion;
use crate::metrics::accuracy;
use crate::serialize::ModelFormat;
use crate::tree::DecisionTree;
use clap::{Parser, Subcommand};
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

/// Train classification trees and predict with them.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "dtree")]
#[command(version)]
#[command(about = "Greedy binary-split classification trees with reduced-error pruning")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Grow a tree on labeled data, prune it and save the model
    Train(TrainArgs),

    /// Load a model and print the input with a predicted label column
    Predict(PredictArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Labeled training data, comma separated with a header row
    pub training_file: PathBuf,

    /// Where to write the model
    pub model_file: PathBuf,

    /// Labeled data to prune against
    #[arg(long)]
    pub validation: Option<PathBuf>,

    /// JSON tree configuration, flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Impurity measure (entropy or gini)
    #[arg(long)]
    pub criterion: Option<SplitCriterion>,

    /// Maximum depth of the tree
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Minimum number of observations needed to split a node
    #[arg(long)]
    pub min_samples_split: Option<usize>,

    /// Minimum score a split needs to be used
    #[arg(long)]
    pub min_gain: Option<f64>,

    /// Model file format (text or json)
    #[arg(long, default_value = "text")]
    pub format: ModelFormat,
}

/// Arguments for the predict command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PredictArgs {
    /// Data to predict, comma separated with a header row
    pub testing_file: PathBuf,

    /// Model written by the train command
    pub model_file: PathBuf,

    /// Every column is a feature, there is no label column
    #[arg(long)]
    pub unlabeled: bool,

    /// Model file format (text or json)
    #[arg(long, default_value = "text")]
    pub format: ModelFormat,
}

/// Parse command line arguments, without exiting on errors.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Run a parsed command.
pub fn run_command(cli: Cli) -> Result<(), TreeError> {
    match cli.command {
        Command::Train(args) => train(&args),
        Command::Predict(args) => {
            let stdout = io::stdout();
            predict(&args, stdout.lock())
        }
    }
}

impl TrainArgs {
    /// The configuration file, if any, with the command line flags applied on top.
    pub fn tree_config(&self) -> Result<TreeConfig, TreeError> {
        let mut config = match &self.config {
            Some(path) => TreeConfig::load_json(path)?,
            None => TreeConfig::default(),
        };
        if let Some(criterion) = self.criterion {
            config = config.set_criterion(criterion);
        }
        if self.max_depth.is_some() {
            config = config.set_max_depth(self.max_depth);
        }
        if let Some(min_samples_split) = self.min_samples_split {
            config = config.set_min_samples_split(min_samples_split);
        }
        if let Some(min_gain) = self.min_gain {
            config = config.set_min_gain(min_gain);
        }
        config.validate()?;
        Ok(config)
    }
}

fn train(args: &TrainArgs) -> Result<(), TreeError> {
    let config = args.tree_config()?;
    let training = Dataset::from_path(&args.training_file, true)?;
    info!(
        "read {} training observations with {} features from {}",
        training.observations.len(),
        training.n_features(),
        args.training_file.display()
    );
    let validation = match &args.validation {
        Some(path) => Some(Dataset::from_path(path, true)?),
        None => None,
    };

    let tree = DecisionTree::train(
        &training.observations,
        validation.as_ref().map(|v| v.observations.as_slice()),
        &config,
    )?;
    tree.save_model(&args.model_file, args.format)?;
    info!("wrote model to {}", args.model_file.display());
    Ok(())
}

fn predict<W: Write>(args: &PredictArgs, writer: W) -> Result<(), TreeError> {
    let tree = DecisionTree::load_model(&args.model_file, args.format)?;
    let dataset = Dataset::from_path(&args.testing_file, !args.unlabeled)?;
    let predictions = tree.predict_all(&dataset.observations)?;
    dataset.write_predictions(&predictions, writer)?;

    if dataset.is_labeled() {
        if let Some(acc) = accuracy(&tree, &dataset.observations)? {
            info!("accuracy: {:.4} on {} observations", acc, dataset.observations.len());
        }
    }
    Ok(())
}
