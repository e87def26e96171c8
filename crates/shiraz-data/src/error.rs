//! Error types for panel loading.

use shiraz_traits::ShirazError;
use thiserror::Error;

/// Errors that can occur when loading input files.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing or DataFrame handling failed.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// The loaded data violates a panel invariant.
    #[error(transparent)]
    Core(#[from] ShirazError),

    /// A date cell could not be parsed or converted.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The file has no usable rows or columns.
    #[error("No data in {0}")]
    NoData(String),
}
