//! Analysis error types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors reported by the analysis engine
///
/// Bad records and unknown symptoms are not errors; they degrade the result
/// instead. Only contract violations by the caller end up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Caller supplied an unusable configuration (e.g. an inverted range)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AnalysisError {
    pub fn inverted_range(start: NaiveDate, end: NaiveDate) -> Self {
        AnalysisError::Configuration(format!(
            "range start {} is after range end {}",
            start, end
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_range_message() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 29).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 25).unwrap();

        let err = AnalysisError::inverted_range(start, end);
        assert_eq!(
            err.to_string(),
            "Configuration error: range start 2025-03-29 is after range end 2025-03-25"
        );
    }
}
