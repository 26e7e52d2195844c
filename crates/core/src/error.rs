//! Error types for the trade-journal pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trade-journal pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Input table is missing required columns. Carries every missing
    /// column, never a partial list.
    #[error("missing required columns: {}", .0.join(", "))]
    Schema(Vec<String>),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed input data.
    #[error("data error: {0}")]
    Data(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a schema error from the missing column names.
    pub fn schema<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Error::Schema(missing.into_iter().map(Into::into).collect())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }
}
