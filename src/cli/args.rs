//! Command line argument parsing for the docclass CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// docclass - train, evaluate and serve document category classifiers
#[derive(Parser, Debug, Clone)]
#[command(name = "docclass")]
#[command(about = "Train, evaluate and serve document category classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct DocClassArgs {
    /// Verbosity level (repeat for more: -v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Directory holding the published model artifacts
    #[arg(long, env = "DOCCLASS_ARTIFACT_DIR", value_name = "DIR", global = true)]
    pub artifact_dir: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long, env = "DOCCLASS_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl DocClassArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train every candidate model on a labeled corpus and publish the best one
    Train(TrainArgs),

    /// Write a synthetic labeled corpus (JSON Lines)
    Generate(GenerateArgs),

    /// Classify one or more texts
    Predict(PredictArgs),

    /// Classify every line of a text file
    #[command(name = "predict-file")]
    PredictFile(PredictFileArgs),

    /// List the categories of the published model
    Categories,

    /// Show the most influential terms of a category
    Importance(ImportanceArgs),

    /// Show the status of the published model
    Info,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled corpus (JSON array or JSON Lines of {"text", "category"})
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Write the ROC curves of all candidates to this JSON file
    #[arg(long, value_name = "FILE")]
    pub roc_output: Option<PathBuf>,

    /// Override the split/model seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for synthetic corpus generation
#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    /// Output file (JSON Lines)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Examples per category
    #[arg(short = 'n', long, default_value = "150")]
    pub per_category: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Texts to classify
    #[arg(value_name = "TEXT", required = true)]
    pub texts: Vec<String>,
}

/// Arguments for file prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictFileArgs {
    /// File with one text per line
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for feature importance
#[derive(Parser, Debug, Clone)]
pub struct ImportanceArgs {
    /// Category name
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Number of terms to show
    #[arg(short = 'n', long, default_value = "10")]
    pub top_n: usize,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
