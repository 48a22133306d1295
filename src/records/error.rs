//! Record loading error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading journal or metric records
#[derive(Error, Debug)]
pub enum RecordError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON document could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structural problem with the input (e.g. a required column is missing)
    #[error("Parse error: {0}")]
    Parse(String),

    /// File extension is not one we know how to read
    #[error("Unsupported record file {0:?}: expected .json or .csv")]
    UnsupportedFormat(PathBuf),
}

/// Result type alias for record loading
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecordError::Parse("missing column: date".to_string());
        assert_eq!(err.to_string(), "Parse error: missing column: date");

        let err = RecordError::UnsupportedFormat(PathBuf::from("data.xml"));
        assert!(err.to_string().contains("data.xml"));
    }
}
