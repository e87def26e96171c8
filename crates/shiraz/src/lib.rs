#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/shiraz/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # shiraz
//!
//! Momentum research engine for a local-calendar equity market.
//!
//! shiraz is an umbrella crate that re-exports all shiraz sub-crates for
//! convenience: rankers partition a universe into winners, middles and
//! losers; backtest engines turn partitions into spread returns; label
//! panels and Fama-MacBeth regressions price the lagged signals.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shiraz::data::{DateFormat, load_panel};
//! use shiraz::eval::{Backtest, SeasonalFilter};
//! use shiraz::signals::momentum::MomentumRanker;
//! use shiraz::MarketData;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let returns = load_panel("data/returns.csv", DateFormat::Local)?;
//! let caps = load_panel("data/market_caps.csv", DateFormat::Local)?;
//! let data = MarketData::new(returns, caps)?;
//!
//! let backtest = Backtest::momentum(MomentumRanker::with_lookback(6), 6, SeasonalFilter::All);
//! println!("{}", backtest.run(&data)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Panels, calendar helpers, partitions and the [`Ranker`] trait
//! - [`signals`] - Momentum, industry momentum and 52-week high rankers
//! - [`eval`] - Backtests, compositions, label panels and premiums
//! - [`data`] - CSV and membership loading, Gregorian conversion

/// Version information for the shiraz crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core types and the ranker trait.
pub mod traits {
    pub use shiraz_traits::*;
}

pub use shiraz_traits::{
    Bucket, BucketPartition, IndustryMembership, LocalDate, MarketData, Panel, Ranker, Result,
    ShirazError, SignalKind, Symbol,
};

/// Ranker implementations.
///
/// - **MomentumRanker**: mean own return over `[t-J, t-1]` among liquid instruments
/// - **IndustryMomentumRanker**: constituents of the top and bottom industries
/// - **YearHighRanker**: proximity to the trailing 52-week high (or low)
pub mod signals {
    pub use shiraz_signals::*;
}

/// Backtests, compositions and premium estimation.
pub mod eval {
    pub use shiraz_eval::*;
}

/// Input loading.
pub mod data {
    pub use shiraz_data::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use shiraz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::eval::{Backtest, FamaMacBeth, PremiumConfig, SeasonalFilter};
    pub use crate::signals::RankerFactory;
    pub use crate::{
        Bucket, BucketPartition, LocalDate, MarketData, Panel, Ranker, Result, ShirazError,
        SignalKind,
    };
}
