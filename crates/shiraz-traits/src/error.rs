//! Error types for the shiraz engine.
//!
//! This module defines the error type shared by the ranking, backtesting and
//! premium-estimation crates. Structural problems (misaligned panels, unknown
//! columns, evaluation indices outside the series) fail fast instead of being
//! papered over with missing values.

use thiserror::Error;

/// The main error type for shiraz operations.
#[derive(Debug, Error)]
pub enum ShirazError {
    /// Two panels that must share an index (or a shape) do not.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// An evaluation index, or a window derived from it, falls outside the series.
    #[error("Index {index} out of range for a series of length {len}")]
    IndexOutOfRange {
        /// The offending (possibly negative) row position.
        index: i64,
        /// Number of rows in the series.
        len: usize,
    },

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A column required by the operation is absent.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// An industry return column has no entry in the membership map.
    #[error("Industry not present in the membership map: {0}")]
    UnknownIndustry(String),

    /// A regression could not be fitted.
    #[error("Regression failed: {0}")]
    Regression(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl ShirazError {
    /// Convenience constructor for [`ShirazError::IndexOutOfRange`].
    pub fn out_of_range(index: impl TryInto<i64>, len: usize) -> Self {
        Self::IndexOutOfRange {
            index: index.try_into().unwrap_or(i64::MAX),
            len,
        }
    }
}

impl From<String> for ShirazError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ShirazError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for shiraz operations.
pub type Result<T> = std::result::Result<T, ShirazError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShirazError::StructuralMismatch("dates differ".to_string());
        assert_eq!(err.to_string(), "Structural mismatch: dates differ");

        let err = ShirazError::out_of_range(-2_i64, 10);
        assert_eq!(err.to_string(), "Index -2 out of range for a series of length 10");
    }

    #[test]
    fn test_error_from_string() {
        let err: ShirazError = "bad".into();
        assert!(matches!(err, ShirazError::Other(_)));
    }

    #[test]
    fn test_unknown_industry_display() {
        let err = ShirazError::UnknownIndustry("Cement".to_string());
        assert!(err.to_string().contains("Cement"));
    }
}
