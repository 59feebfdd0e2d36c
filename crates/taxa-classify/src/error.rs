//! Error types for taxa-classify.

use thiserror::Error;

use crate::category::Category;

/// Result type for taxa-classify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for taxa-classify operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A label outside the taxonomic category set.
    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),

    /// Confusion counts do not add up to the number of evaluated records.
    #[error(
        "Integrity error under {rule} for {category}: TP+FP+TN+FN = {counted}, expected {expected}"
    )]
    Integrity {
        rule: String,
        category: Category,
        counted: usize,
        expected: usize,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model training, loading or saving failed.
    #[error("Model error: {0}")]
    Model(String),
}

impl Error {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a model error.
    pub fn model(msg: impl Into<String>) -> Self {
        Error::Model(msg.into())
    }
}
