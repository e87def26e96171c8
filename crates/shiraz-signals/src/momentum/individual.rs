//! Individual-stock momentum ranker.

use super::{split_tails, symbols_at, window_start};
use crate::liquidity::LiquidityFilter;
use serde::{Deserialize, Serialize};
use shiraz_traits::{BucketPartition, MarketData, Ranker, Result, SignalKind, stats::complete_mean};

/// Configuration for the individual momentum ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Number of periods J in the ranking window (default: 6)
    pub lookback: usize,
    /// Liquidity filter applied over `[t-J, t]`
    pub liquidity: LiquidityFilter,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 6,
            liquidity: LiquidityFilter::default(),
        }
    }
}

/// Individual-stock momentum ranker.
///
/// At row `t` the liquid universe is built from market caps over
/// `[t-J, t]`. The signal is each liquid instrument's mean return over
/// `[t-J, t-1]`, instruments with any missing return in that window being
/// left unranked. Winners are at or above the 70th percentile of the
/// signal, losers at or below the 30th; every other liquid instrument,
/// unranked ones included, is a middle.
///
/// # Example
///
/// ```ignore
/// use shiraz_signals::momentum::MomentumRanker;
/// use shiraz_traits::Ranker;
///
/// let ranker = MomentumRanker::with_lookback(3);
/// let partition = ranker.rank(&market_data, 12)?;
/// ```
#[derive(Debug, Clone)]
pub struct MomentumRanker {
    config: MomentumConfig,
}

impl MomentumRanker {
    /// Create a new momentum ranker with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Create a ranker with the given lookback and the default liquidity filter.
    #[must_use]
    pub fn with_lookback(lookback: usize) -> Self {
        Self::new(MomentumConfig {
            lookback,
            ..Default::default()
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }
}

impl Default for MomentumRanker {
    fn default() -> Self {
        Self::new(MomentumConfig::default())
    }
}

impl Ranker for MomentumRanker {
    fn name(&self) -> &str {
        "momentum"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::Momentum
    }

    fn lookback(&self) -> usize {
        self.config.lookback
    }

    fn rank(&self, data: &MarketData, t: usize) -> Result<BucketPartition> {
        let start = window_start(t, self.config.lookback, data.n_periods())?;
        let liquid = self
            .config
            .liquidity
            .liquid_columns(data.market_caps(), start..=t)?;

        let returns = data.returns().values();
        let signal: Vec<(usize, f64)> = liquid
            .iter()
            .filter_map(|&j| complete_mean((start..t).map(|i| returns[[i, j]])).map(|m| (j, m)))
            .collect();

        let (winners, losers) = split_tails(&signal);
        let middles: Vec<usize> = liquid
            .iter()
            .copied()
            .filter(|j| !winners.contains(j) && !losers.contains(j))
            .collect();

        tracing::trace!(
            t,
            liquid = liquid.len(),
            ranked = signal.len(),
            winners = winners.len(),
            losers = losers.len(),
            "ranked individual momentum"
        );

        let columns = data.symbols();
        Ok(BucketPartition::new(
            symbols_at(columns, &winners),
            symbols_at(columns, &losers),
            symbols_at(columns, &middles),
        ))
    }
}
