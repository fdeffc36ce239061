//! Error types for loading and scoring institution metrics.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaterError {
    #[error("dataset is empty: nothing to aggregate")]
    EmptyDataset,

    /// `line` is 1-based and counts the header row; `None` when the problem is
    /// in the header itself.
    #[error("malformed input{}: column '{column}': {reason}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    MalformedInput {
        line: Option<u64>,
        column: String,
        reason: String,
    },

    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    #[error("weight mapping mismatch: {reason}")]
    WeightMismatch { reason: String },

    /// Score was handed summaries and normalized rows for different institutions.
    #[error("no normalized row for institution '{institution}'")]
    MissingNormalized { institution: String },

    #[error("invalid metric partition: {reason}")]
    InvalidPartition { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RaterError {
    pub fn malformed(line: Option<u64>, column: impl Into<String>, reason: impl Into<String>) -> Self {
        RaterError::MalformedInput {
            line,
            column: column.into(),
            reason: reason.into(),
        }
    }
}

pub type RaterResult<T> = Result<T, RaterError>;
