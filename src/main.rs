//! dtree command line tool
//!
//! ```bash
//! # Grow a tree, prune it against held out data and save it
//! dtree train train.csv model.txt --validation validation.csv
//!
//! # Predict, the input is echoed with a predicted_label column
//! dtree predict test.csv model.txt
//! ```
//!
//! Logs go to stderr, filtered with `RUST_LOG` (default `info`).

use clap::Parser;
use dtree::cli::{run_command, Cli};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
