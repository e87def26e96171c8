//! Winner/loser rankers for shiraz.
//!
//! This crate provides the three cross-sectional rankers:
//! - Momentum: individual-stock trailing mean return
//! - Industry momentum: trailing industry return mapped to constituents
//! - Year high: proximity to the trailing 52-week high (or low)
//!
//! Each ranker implements [`shiraz_traits::Ranker`] and splits the eligible
//! universe at the 70th / 30th percentile of its signal.
//!
//! # Example
//!
//! ```ignore
//! use shiraz_signals::momentum::MomentumRanker;
//! use shiraz_signals::registry::available_rankers;
//! use shiraz_traits::Ranker;
//!
//! let ranker = MomentumRanker::with_lookback(6);
//! let partition = ranker.rank(&market_data, 20)?;
//!
//! // Discover available rankers
//! let rankers = available_rankers();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod liquidity;
pub mod momentum;
pub mod registry;
pub mod year_high;

// Re-export key types
pub use liquidity::LiquidityFilter;
pub use registry::{RankerFactory, RankerInfo};
pub use year_high::{Orientation, YearHighRanker, trailing_high_ratio};
