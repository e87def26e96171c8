//! Strategy composition.
//!
//! An outer ranker splits the universe at each of its evaluation dates; the
//! inner engine is then backtested separately on the winners, the middles
//! and the losers. The grid reports, per outer bucket, the inner winner,
//! loser and spread returns averaged across outer dates, once on the full
//! panel and once with the seasonal month removed.

use crate::{
    backtest::{Backtest, SeasonalFilter},
    metrics::MeanStat,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shiraz_signals::RankerFactory;
use shiraz_traits::{Bucket, MarketData, Ranker, Result, SignalKind, stats::Ddof};
use std::{fmt, ops::Range};

/// Inner result reported in a composition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InnerMetric {
    /// Inner winner portfolio return
    Winner,
    /// Inner loser portfolio return
    Loser,
    /// Inner winner-minus-loser return
    Spread,
}

impl InnerMetric {
    /// All metrics in display order.
    pub const ALL: [Self; 3] = [Self::Winner, Self::Loser, Self::Spread];

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Winner => "Winner",
            Self::Loser => "Loser",
            Self::Spread => "Winner - Loser",
        }
    }
}

impl fmt::Display for InnerMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composition parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Outer ranker lookback (default: 6)
    pub outer_lookback: usize,
    /// Inner ranker lookback (default: 6)
    pub inner_lookback: usize,
    /// Inner holding length (default: 6)
    pub inner_holding: usize,
    /// Outer evaluation indices `[start, end)`; defaults to `2J+1..n`.
    /// The end is clamped to the panel length.
    pub window: Option<(usize, usize)>,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            outer_lookback: 6,
            inner_lookback: 6,
            inner_holding: 6,
            window: None,
        }
    }
}

impl ComposeConfig {
    fn outer_range(&self, outer: &dyn Ranker, n: usize) -> Range<usize> {
        match self.window {
            Some((start, end)) => start..end.min(n),
            None => (2 * outer.lookback() + 1)..n,
        }
    }
}

/// One row of a composition grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRow {
    /// Outer bucket the inner engine ran on
    pub outer_bucket: Bucket,
    /// Inner quantity
    pub metric: InnerMetric,
    /// Average over outer dates, full panel
    pub all: MeanStat,
    /// Average over outer dates, seasonal month removed
    pub excluding_seasonal: MeanStat,
}

/// Nine-row result of composing two signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionGrid {
    /// Signal splitting the universe
    pub outer: SignalKind,
    /// Signal backtested within each bucket
    pub inner: SignalKind,
    /// Rows ordered by outer bucket then metric
    pub rows: Vec<CompositionRow>,
}

impl CompositionGrid {
    /// Short title, e.g. `FT x JT`.
    pub fn title(&self) -> String {
        format!("{} x {}", self.outer.code(), self.inner.code())
    }

    /// Row for an outer bucket and inner metric.
    pub fn get(&self, bucket: Bucket, metric: InnerMetric) -> Option<&CompositionRow> {
        self.rows
            .iter()
            .find(|r| r.outer_bucket == bucket && r.metric == metric)
    }

    /// DataFrame with one row per (outer bucket, metric).
    ///
    /// # Errors
    ///
    /// Propagates polars construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df! {
            "outer_bucket" => self.rows.iter().map(|r| r.outer_bucket.label()).collect::<Vec<_>>(),
            "inner_metric" => self.rows.iter().map(|r| r.metric.label()).collect::<Vec<_>>(),
            "average_monthly_return" => self.rows.iter().map(|r| r.all.mean).collect::<Vec<_>>(),
            "t_stat" => self.rows.iter().map(|r| r.all.stat).collect::<Vec<_>>(),
            "excluding_seasonal" => self.rows.iter().map(|r| r.excluding_seasonal.mean).collect::<Vec<_>>(),
            "excluding_seasonal_t_stat" => self.rows.iter().map(|r| r.excluding_seasonal.stat).collect::<Vec<_>>(),
        }?;
        Ok(df)
    }
}

/// Per outer bucket, per inner metric, the series across outer dates.
pub type BucketSeries = [[Vec<f64>; 3]; 3];

/// Runs `inner` inside every bucket of `outer`.
///
/// Returns the nine series (bucket-major) of inner means, one entry per
/// outer evaluation date. An empty bucket contributes `NaN`.
///
/// # Errors
///
/// Propagates outer ranker and inner backtest errors.
pub fn compose_series(
    outer: &dyn Ranker,
    inner: &Backtest,
    data: &MarketData,
    window: Range<usize>,
) -> Result<BucketSeries> {
    let mut series: BucketSeries = Default::default();

    for t in window {
        let partition = outer.rank(data, t)?;
        for (b, bucket) in Bucket::ALL.into_iter().enumerate() {
            let members = partition.bucket(bucket);
            let (w, l, s) = if members.is_empty() {
                (f64::NAN, f64::NAN, f64::NAN)
            } else {
                let result = inner.run(&data.restrict(members)?)?;
                (result.winner.mean, result.loser.mean, result.spread.mean)
            };
            series[b][0].push(w);
            series[b][1].push(l);
            series[b][2].push(s);
        }
        tracing::debug!(date = %data.dates()[t], t, "outer date composed");
    }
    Ok(series)
}

/// Composes `outer` with `inner` on the full panel and on the panel without
/// the seasonal month.
///
/// # Errors
///
/// Propagates ranker and backtest errors, including
/// [`shiraz_traits::ShirazError::IndexOutOfRange`] when an explicit window
/// starts before the outer lookback.
pub fn compose(
    outer: &dyn Ranker,
    inner: &Backtest,
    data: &MarketData,
    config: &ComposeConfig,
) -> Result<CompositionGrid> {
    let seasonal_free = data.without_seasonal_month()?;
    let all = compose_series(outer, inner, data, config.outer_range(outer, data.n_periods()))?;
    let excluded = compose_series(
        outer,
        inner,
        &seasonal_free,
        config.outer_range(outer, seasonal_free.n_periods()),
    )?;

    let mut rows = Vec::with_capacity(9);
    for (b, bucket) in Bucket::ALL.into_iter().enumerate() {
        for (m, metric) in InnerMetric::ALL.into_iter().enumerate() {
            let summarize = |values: &[f64]| match metric {
                InnerMetric::Spread => MeanStat::from_series(values, Ddof::Population),
                InnerMetric::Winner | InnerMetric::Loser => MeanStat::mean_only(values),
            };
            rows.push(CompositionRow {
                outer_bucket: bucket,
                metric,
                all: summarize(&all[b][m]),
                excluding_seasonal: summarize(&excluded[b][m]),
            });
        }
    }

    let grid = CompositionGrid {
        outer: outer.kind(),
        inner: inner.ranker().kind(),
        rows,
    };
    tracing::info!(grid = %grid.title(), "composition complete");
    Ok(grid)
}

/// Builds both rankers from `factory` and composes them.
///
/// # Errors
///
/// Fails if the factory cannot build either ranker, then as [`compose`].
pub fn compose_signals(
    factory: &RankerFactory,
    outer: SignalKind,
    inner: SignalKind,
    data: &MarketData,
    config: &ComposeConfig,
) -> Result<CompositionGrid> {
    let outer = factory.build(outer, config.outer_lookback)?;
    let inner = Backtest::for_ranker(
        factory.build(inner, config.inner_lookback)?,
        config.inner_holding,
        SeasonalFilter::All,
    );
    compose(outer.as_ref(), &inner, data, config)
}

/// All nine outer/inner combinations, outer-major.
///
/// # Errors
///
/// As [`compose_signals`].
pub fn compose_all(
    factory: &RankerFactory,
    data: &MarketData,
    config: &ComposeConfig,
) -> Result<Vec<CompositionGrid>> {
    SignalKind::ALL
        .into_iter()
        .flat_map(|outer| SignalKind::ALL.into_iter().map(move |inner| (outer, inner)))
        .map(|(outer, inner)| compose_signals(factory, outer, inner, data, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use shiraz_signals::momentum::MomentumRanker;
    use shiraz_traits::{LocalDate, Panel};

    fn market_with(n: usize, returns: impl Fn(usize) -> f64) -> MarketData {
        let dates: Vec<LocalDate> = (0..n)
            .map(|i| LocalDate::new(1398 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap())
            .collect();
        let setup: Vec<(String, f64)> = (0..10).map(|k| (format!("S{k}"), returns(k))).collect();
        let returns = setup.iter().map(|(s, r)| (s.clone(), vec![*r; n])).collect();
        let caps = setup.iter().map(|(s, _)| (s.clone(), vec![50.0; n])).collect();
        MarketData::new(
            Panel::from_columns(dates.clone(), returns).unwrap(),
            Panel::from_columns(dates, caps).unwrap(),
        )
        .unwrap()
    }

    /// S0..S9 earn a constant -5%..4% in 1% steps.
    fn market(n: usize) -> MarketData {
        market_with(n, |k| -0.05 + 0.01 * k as f64)
    }

    #[test]
    fn test_grid_shape_and_order() {
        let data = market(20);
        let outer = MomentumRanker::with_lookback(2);
        let inner =
            Backtest::momentum(MomentumRanker::with_lookback(2), 1, SeasonalFilter::All);
        let config = ComposeConfig {
            outer_lookback: 2,
            inner_lookback: 2,
            inner_holding: 1,
            window: Some((5, 8)),
        };
        let grid = compose(&outer, &inner, &data, &config).unwrap();

        assert_eq!(grid.rows.len(), 9);
        assert_eq!(grid.rows[0].outer_bucket, Bucket::Winners);
        assert_eq!(grid.rows[0].metric, InnerMetric::Winner);
        assert_eq!(grid.rows[8].outer_bucket, Bucket::Losers);
        assert_eq!(grid.rows[8].metric, InnerMetric::Spread);
        assert_eq!(grid.title(), "JT x JT");

        let df = grid.to_dataframe().unwrap();
        assert_eq!(df.height(), 9);
    }

    #[test]
    fn test_inner_spread_positive_within_every_bucket() {
        let data = market(20);
        let outer = MomentumRanker::with_lookback(2);
        let inner =
            Backtest::momentum(MomentumRanker::with_lookback(2), 1, SeasonalFilter::All);
        let config = ComposeConfig {
            window: Some((5, 7)),
            ..Default::default()
        };
        let grid = compose(&outer, &inner, &data, &config).unwrap();

        for bucket in Bucket::ALL {
            let row = grid.get(bucket, InnerMetric::Spread).unwrap();
            assert!(row.all.mean > 0.0, "{bucket} spread {}", row.all.mean);
            let winner = grid.get(bucket, InnerMetric::Winner).unwrap();
            assert!(winner.all.stat.is_nan());
        }
    }

    #[rstest]
    #[case(Bucket::Winners, 0.04, 0.02)]
    #[case(Bucket::Middles, 0.01, -0.02)]
    #[case(Bucket::Losers, -0.03, -0.05)]
    fn test_cells_are_inner_results_within_each_bucket(
        #[case] bucket: Bucket,
        #[case] winner: f64,
        #[case] loser: f64,
    ) {
        // Outer J=2 splits S7-S9 / S3-S6 / S0-S2; inside each bucket the
        // inner engine picks its top and bottom instrument every date.
        let data = market(20);
        let outer = MomentumRanker::with_lookback(2);
        let inner =
            Backtest::momentum(MomentumRanker::with_lookback(2), 1, SeasonalFilter::All);
        let config = ComposeConfig {
            window: Some((5, 9)),
            ..Default::default()
        };
        let grid = compose(&outer, &inner, &data, &config).unwrap();

        let cell = |metric| grid.get(bucket, metric).unwrap();
        for (metric, expected) in [
            (InnerMetric::Winner, winner),
            (InnerMetric::Loser, loser),
            (InnerMetric::Spread, winner - loser),
        ] {
            assert_relative_eq!(cell(metric).all.mean, expected, epsilon = 1e-12);
            assert_relative_eq!(cell(metric).excluding_seasonal.mean, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_outer_bucket_gives_nan_cells() {
        // Identical returns put every instrument in the winner bucket.
        let data = market_with(20, |_| 0.01);
        let outer = MomentumRanker::with_lookback(2);
        let inner =
            Backtest::momentum(MomentumRanker::with_lookback(2), 1, SeasonalFilter::All);
        let config = ComposeConfig {
            window: Some((5, 9)),
            ..Default::default()
        };
        let grid = compose(&outer, &inner, &data, &config).unwrap();

        for bucket in [Bucket::Middles, Bucket::Losers] {
            for metric in InnerMetric::ALL {
                let row = grid.get(bucket, metric).unwrap();
                assert!(row.all.mean.is_nan(), "{bucket} {metric}");
                assert!(row.excluding_seasonal.mean.is_nan(), "{bucket} {metric}");
            }
        }
        let winners = grid.get(Bucket::Winners, InnerMetric::Winner).unwrap();
        assert_relative_eq!(winners.all.mean, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_window_clamped_to_panel() {
        let config = ComposeConfig {
            window: Some((5, 100)),
            ..Default::default()
        };
        let outer = MomentumRanker::with_lookback(2);
        assert_eq!(config.outer_range(&outer, 20), 5..20);
        let default = ComposeConfig::default();
        assert_eq!(default.outer_range(&outer, 20), 5..20);
    }
}
