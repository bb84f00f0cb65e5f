//! Error types for the stock viewer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loading, filtering and rendering price series.
#[derive(Error, Debug)]
pub enum StockError {
    #[error("Data not found: {}", path.display())]
    DataNotFound { path: PathBuf },

    #[error("Malformed data in {} at row {row}: {reason}", path.display())]
    MalformedData {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Price series is empty")]
    EmptySeries,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl StockError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, row: usize, reason: impl Into<String>) -> Self {
        StockError::MalformedData {
            path: path.into(),
            row,
            reason: reason.into(),
        }
    }
}

/// Result type alias for stock viewer operations.
pub type Result<T> = std::result::Result<T, StockError>;
