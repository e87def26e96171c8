#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/shiraz/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the shiraz momentum research engine.
//!
//! This crate provides the foundational abstractions shared by the rankers,
//! backtest engines and premium estimation: local-calendar dates, aligned
//! panels, the market data bundle, bucket partitions and the [`Ranker`] trait.

/// The version of the shiraz-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod calendar;
pub mod error;
pub mod industry;
pub mod market;
pub mod ranker;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, ShirazError};
pub use industry::IndustryMembership;
pub use market::{MarketData, ProximityPanel};
pub use ranker::{Bucket, BucketPartition, LOSER_QUANTILE, Ranker, SignalKind, WINNER_QUANTILE};
pub use types::{LocalDate, Panel, Symbol};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
