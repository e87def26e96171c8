//! Backtesting and premium estimation for shiraz.
//!
//! This crate turns bucket partitions into research results:
//! - Backtest engines accumulating winner, loser and spread returns
//! - Strategy composition (one ranker inside the buckets of another)
//! - Lagged winner/loser label panels
//! - OLS and two-pass Fama-MacBeth premium estimation
//!
//! # Example
//!
//! ```rust,ignore
//! use shiraz_eval::{Backtest, SeasonalFilter};
//! use shiraz_signals::momentum::MomentumRanker;
//!
//! let backtest = Backtest::momentum(MomentumRanker::with_lookback(6), 6, SeasonalFilter::All);
//! let result = backtest.run(&market_data)?;
//! println!("{result}");
//! ```

pub mod backtest;
pub mod compose;
pub mod fama_macbeth;
pub mod labels;
pub mod metrics;
pub mod regression;

pub use backtest::{Backtest, BacktestConfig, BacktestSeries, RankingCadence, SeasonalFilter};
pub use compose::{
    ComposeConfig, CompositionGrid, CompositionRow, InnerMetric, compose, compose_all,
    compose_signals,
};
pub use fama_macbeth::{FamaMacBeth, Premium, PremiumConfig, PremiumDiagnostics, PremiumTable};
pub use labels::{LabelBuilder, LabelPanel, LabelPanelBuilder, LabelSpec};
pub use metrics::{MeanStat, StrategyResult, format_stat};
pub use regression::{OlsFit, ols};
