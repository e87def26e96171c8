//! 52-week high proximity.
//!
//! Instruments trading close to their trailing one-year high are winners,
//! those far from it losers. The ratio panel is built once from monthly
//! prices and its per-date percentile series live in
//! [`shiraz_traits::ProximityPanel`].

use crate::{liquidity::LiquidityFilter, momentum::symbols_at};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shiraz_traits::{BucketPartition, MarketData, Panel, Ranker, Result, ShirazError, SignalKind};

/// Which tail of the proximity ratio counts as the winner bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Winners are closest to the year high (ratio at or above the 70th percentile).
    #[default]
    High,
    /// Winners are furthest from the high, i.e. closest to the year low
    /// (ratio at or below the 30th percentile).
    Low,
}

/// Configuration for the 52-week high ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearHighConfig {
    /// Lookback J; only sets where an engine may start evaluating (default: 6)
    pub lookback: usize,
    /// Tail treated as winners
    pub orientation: Orientation,
    /// Liquidity filter, applied to the single period before `t`
    pub liquidity: LiquidityFilter,
}

impl Default for YearHighConfig {
    fn default() -> Self {
        Self {
            lookback: 6,
            orientation: Orientation::High,
            liquidity: LiquidityFilter::default(),
        }
    }
}

/// 52-week high (or low) proximity ranker.
///
/// At row `t` everything is read from row `t-1`: the liquid universe from
/// that row's market caps, the ratio of each liquid instrument, and the
/// precomputed percentile thresholds of that row.
#[derive(Debug, Clone)]
pub struct YearHighRanker {
    config: YearHighConfig,
}

impl YearHighRanker {
    /// Create a new ranker with the given configuration.
    #[must_use]
    pub const fn new(config: YearHighConfig) -> Self {
        Self { config }
    }

    /// Create a ranker with the given lookback and orientation.
    #[must_use]
    pub fn with_lookback(lookback: usize, orientation: Orientation) -> Self {
        Self::new(YearHighConfig {
            lookback,
            orientation,
            ..Default::default()
        })
    }

    /// The winner tail of this ranker.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.config.orientation
    }
}

impl Default for YearHighRanker {
    fn default() -> Self {
        Self::new(YearHighConfig::default())
    }
}

impl Ranker for YearHighRanker {
    fn name(&self) -> &str {
        match self.config.orientation {
            Orientation::High => "year_high",
            Orientation::Low => "year_low",
        }
    }

    fn kind(&self) -> SignalKind {
        SignalKind::YearHigh
    }

    fn lookback(&self) -> usize {
        self.config.lookback
    }

    fn rank(&self, data: &MarketData, t: usize) -> Result<BucketPartition> {
        let proximity = data.require_proximity()?;
        let n = data.n_periods();
        if t >= n {
            return Err(ShirazError::out_of_range(t, n));
        }
        let row = t
            .checked_sub(1)
            .ok_or_else(|| ShirazError::out_of_range(-1_i64, n))?;

        let liquid = self
            .config
            .liquidity
            .liquid_columns(data.market_caps(), row..=row)?;
        let (upper, lower) = proximity
            .thresholds(row)
            .ok_or_else(|| ShirazError::out_of_range(row, n))?;
        let ratios = proximity.ratios().values();

        let (mut winners, mut losers, mut middles) = (Vec::new(), Vec::new(), Vec::new());
        for &j in &liquid {
            let ratio = ratios[[row, j]];
            let (top, bottom) = (ratio >= upper, ratio <= lower);
            let (is_winner, is_loser) = match self.config.orientation {
                Orientation::High => (top, bottom),
                Orientation::Low => (bottom, top),
            };
            if is_winner {
                winners.push(j);
            } else if is_loser {
                losers.push(j);
            } else {
                middles.push(j);
            }
        }

        tracing::trace!(
            t,
            liquid = liquid.len(),
            winners = winners.len(),
            losers = losers.len(),
            "ranked year-high proximity"
        );

        let columns = data.symbols();
        Ok(BucketPartition::new(
            symbols_at(columns, &winners),
            symbols_at(columns, &losers),
            symbols_at(columns, &middles),
        ))
    }
}

/// Price divided by its trailing one-year high.
///
/// The output starts at the last row dated no later than one local year
/// after the first date. For each output date `d` the high is the maximum
/// non-missing price over `[d - 1 year, d]`; a missing price, or a window
/// without any price, gives `NaN`.
///
/// # Errors
///
/// Returns [`ShirazError::InsufficientData`] for an empty panel.
pub fn trailing_high_ratio(prices: &Panel) -> Result<Panel> {
    let dates = prices.dates();
    let first = *dates
        .first()
        .ok_or_else(|| ShirazError::InsufficientData("empty price panel".to_string()))?;
    let horizon = first.years_later(1);
    let start = dates.partition_point(|d| *d <= horizon).saturating_sub(1);

    let values = prices.values();
    let mut out = Array2::from_elem((dates.len() - start, prices.n_cols()), f64::NAN);
    for (k, i) in (start..dates.len()).enumerate() {
        let window_start = dates.partition_point(|d| *d < dates[i].years_earlier(1));
        for j in 0..prices.n_cols() {
            let high = (window_start..=i)
                .map(|r| values[[r, j]])
                .filter(|p| !p.is_nan())
                .fold(f64::NAN, f64::max);
            out[[k, j]] = values[[i, j]] / high;
        }
    }

    Panel::new(dates[start..].to_vec(), prices.columns().to_vec(), out)
}
