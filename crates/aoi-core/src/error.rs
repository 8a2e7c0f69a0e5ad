use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while building AOI annotations.
#[derive(Error, Debug)]
pub enum AnnotateError {
    /// The sensor export could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The annotations file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited-text record could not be parsed or serialized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No record in the export starts with the data-header sentinel.
    #[error("Header sentinel {sentinel:?} not found in first column of {path}")]
    SentinelNotFound { path: PathBuf, sentinel: String },

    /// A column the pipeline depends on is absent from the data header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A data row has no value in a column that must be populated.
    #[error("Missing value for column {column} in data row {row}")]
    MissingValue { row: usize, column: String },

    /// A `Timestamp` cell is not a number of milliseconds.
    #[error("Invalid timestamp {value:?} in data row {row}")]
    InvalidTimestamp { row: usize, value: String },

    /// A JSON configuration document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the annotation crates.
pub type Result<T> = std::result::Result<T, AnnotateError>;
