//! `taxa-classify` command-line interface: one subcommand per pipeline step.
//!
//! ```bash
//! taxa-classify clean posts.csv -o cleaned.csv
//! taxa-classify train training.csv --model model.bin
//! taxa-classify predict test.csv --model model.bin -o evaluation.csv
//! taxa-classify evaluate evaluation.csv -o argmax_metrics.csv
//! taxa-classify sweep evaluation.csv -o threshold_metrics.csv --summary-output summary.csv
//! taxa-classify apply cleaned.csv --model model.bin -o applied.csv
//! taxa-classify sentiment posts.csv -o sentiment.csv
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{
    dataset::{
        CAPTION_COLUMN, CATEGORY_COLUMN, CLEANED_TEXT_COLUMN, PREDICTION_COLUMN, TEXT_COLUMN,
    },
    eval::sweep::{DEFAULT_END_PERCENT, DEFAULT_START_PERCENT, DEFAULT_STEP_PERCENT},
};

#[derive(Parser)]
#[command(name = "taxa-classify", version)]
#[command(about = "Classify conservation posts by taxon and evaluate the classifier", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log progress information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean raw captions into a cleaned text column
    Clean(CleanArgs),
    /// Train a naive Bayes classifier on labelled cleaned text
    Train(TrainArgs),
    /// Add arg-max predictions to a labelled test set
    Predict(PredictArgs),
    /// Per-category metrics of the arg-max predictions
    Evaluate(EvaluateArgs),
    /// Per-category and averaged metrics across probability thresholds
    Sweep(SweepArgs),
    /// Label every post of a full dataset
    Apply(ApplyArgs),
    /// Score raw captions with VADER and bucket them into pos/neu/neg
    Sentiment(SentimentArgs),
}

/// Input table and optional output path shared by every subcommand.
#[derive(Args)]
pub struct IoArgs {
    /// Input CSV file
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Output CSV file (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Column holding the raw caption
    #[arg(long, default_value = TEXT_COLUMN)]
    pub text_column: String,

    /// Column to write the cleaned caption to
    #[arg(long, default_value = CLEANED_TEXT_COLUMN)]
    pub cleaned_column: String,

    /// Additional stop words (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub stopwords: Vec<String>,
}

#[derive(Args)]
pub struct TrainArgs {
    /// Training CSV file
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Where to write the trained model
    #[arg(short, long, env = "TAXA_MODEL", value_name = "PATH")]
    pub model: PathBuf,

    #[arg(long, default_value = TEXT_COLUMN)]
    pub text_column: String,

    #[arg(long, default_value = CATEGORY_COLUMN)]
    pub category_column: String,

    /// Laplace smoothing
    #[arg(long, default_value_t = 1.0)]
    pub alpha: f64,

    /// Largest word n-gram size
    #[arg(long, default_value_t = 1)]
    pub max_ngram: usize,

    /// Minimum document frequency (proportion below 1, absolute count otherwise)
    #[arg(long, default_value_t = 1.0)]
    pub min_df: f64,

    /// Maximum document frequency (proportion up to 1, absolute count otherwise)
    #[arg(long, default_value_t = 1.0)]
    pub max_df: f64,
}

#[derive(Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Trained model
    #[arg(short, long, env = "TAXA_MODEL", value_name = "PATH")]
    pub model: PathBuf,

    #[arg(long, default_value = CLEANED_TEXT_COLUMN)]
    pub text_column: String,
}

#[derive(Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[arg(long, default_value = CATEGORY_COLUMN)]
    pub category_column: String,

    /// Column holding the serialised probability mapping
    #[arg(long, default_value = PREDICTION_COLUMN)]
    pub prediction_column: String,
}

#[derive(Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub evaluate: EvaluateArgs,

    /// Also write one averaged row per threshold to this file
    #[arg(long, value_name = "PATH")]
    pub summary_output: Option<PathBuf>,

    /// First threshold, in percent
    #[arg(long, default_value_t = DEFAULT_START_PERCENT)]
    pub start: u32,

    /// Last threshold (inclusive), in percent
    #[arg(long, default_value_t = DEFAULT_END_PERCENT)]
    pub end: u32,

    /// Threshold step, in percent
    #[arg(long, default_value_t = DEFAULT_STEP_PERCENT)]
    pub step: u32,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Trained model
    #[arg(short, long, env = "TAXA_MODEL", value_name = "PATH")]
    pub model: PathBuf,

    #[arg(long, default_value = CLEANED_TEXT_COLUMN)]
    pub text_column: String,

    /// Label with a probability threshold instead of arg-max
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Also write the probability mapping of each post
    #[arg(long)]
    pub with_probabilities: bool,
}

#[derive(Args)]
pub struct SentimentArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Column holding the raw caption
    #[arg(long, default_value = CAPTION_COLUMN)]
    pub caption_column: String,
}

/// Install the `tracing` subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init_logging(cli: &Cli) {
    let default_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, true) => "info",
        _ => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Clean(args) => commands::clean(args),
        Command::Train(args) => commands::train(args),
        Command::Predict(args) => commands::predict(args),
        Command::Evaluate(args) => commands::evaluate(args, cli.quiet),
        Command::Sweep(args) => commands::sweep(args, cli.quiet),
        Command::Apply(args) => commands::apply(args),
        Command::Sentiment(args) => commands::sentiment(args),
    }
}
