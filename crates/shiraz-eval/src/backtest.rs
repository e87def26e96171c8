//! Backtest engines.
//!
//! One engine walks the evaluation dates of a panel, partitions the universe
//! with a ranker and accumulates the realized winner, loser and spread
//! returns over a holding window. The three engines differ only in their
//! ranker and in when that ranker is called.

use crate::metrics::StrategyResult;
use serde::{Deserialize, Serialize};
use shiraz_signals::{
    YearHighRanker,
    momentum::{IndustryMomentumRanker, MomentumRanker},
};
use shiraz_traits::{
    BucketPartition, LocalDate, MarketData, Ranker, Result, ShirazError, SignalKind,
    calendar::is_seasonal, stats::nan_mean,
};
use std::collections::HashMap;

/// When the engine calls its ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingCadence {
    /// Rank once at the evaluation index `t` and reuse the partition for
    /// every holding offset (individual momentum and year-high engines).
    PerEvaluation,
    /// Rank again at every holding offset `i` in `[t-K-1, t-1)` (industry
    /// momentum engine).
    PerHoldingOffset,
}

impl RankingCadence {
    /// The cadence the engine for `kind` uses.
    pub const fn for_kind(kind: SignalKind) -> Self {
        match kind {
            SignalKind::IndustryMomentum => Self::PerHoldingOffset,
            SignalKind::Momentum | SignalKind::YearHigh => Self::PerEvaluation,
        }
    }
}

/// Which evaluation dates contribute returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonalFilter {
    /// Every evaluation date.
    #[default]
    All,
    /// Only dates outside the seasonal month.
    ExcludeSeasonal,
    /// Only dates inside the seasonal month.
    SeasonalOnly,
}

impl SeasonalFilter {
    /// Whether returns realized on `date` are accumulated.
    pub const fn includes(&self, date: &LocalDate) -> bool {
        match self {
            Self::All => true,
            Self::ExcludeSeasonal => !is_seasonal(date),
            Self::SeasonalOnly => is_seasonal(date),
        }
    }
}

/// Backtest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Holding length K in periods
    pub holding: usize,
    /// Ranking cadence
    pub cadence: RankingCadence,
    /// Seasonal filter on evaluation dates
    pub seasonal: SeasonalFilter,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            holding: 6,
            cadence: RankingCadence::PerEvaluation,
            seasonal: SeasonalFilter::All,
        }
    }
}

/// Per-date accumulated returns of one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestSeries {
    /// Evaluation dates
    pub dates: Vec<LocalDate>,
    /// Winner return summed over the holding offsets
    pub winner: Vec<f64>,
    /// Loser return summed over the holding offsets
    pub loser: Vec<f64>,
    /// Winner-minus-loser return summed over the holding offsets
    pub spread: Vec<f64>,
}

impl BacktestSeries {
    /// Aggregates the series into a [`StrategyResult`].
    pub fn summarize(&self, strategy: impl Into<String>) -> StrategyResult {
        StrategyResult::from_series(strategy, &self.winner, &self.loser, &self.spread)
    }
}

/// Backtesting engine.
#[derive(Debug)]
pub struct Backtest {
    ranker: Box<dyn Ranker>,
    config: BacktestConfig,
}

impl Backtest {
    /// Create a new backtest from a ranker and configuration.
    ///
    /// # Arguments
    ///
    /// * `ranker` - Ranker partitioning the universe
    /// * `config` - Holding length, cadence and seasonal filter
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use shiraz_eval::{Backtest, BacktestConfig};
    /// use shiraz_signals::momentum::MomentumRanker;
    ///
    /// let backtest = Backtest::new(Box::new(MomentumRanker::with_lookback(6)), BacktestConfig::default());
    /// ```
    pub fn new(ranker: Box<dyn Ranker>, config: BacktestConfig) -> Self {
        Self { ranker, config }
    }

    /// Builds the engine matching `ranker`'s signal: industry momentum
    /// re-ranks per holding offset, the others once per evaluation date.
    pub fn for_ranker(ranker: Box<dyn Ranker>, holding: usize, seasonal: SeasonalFilter) -> Self {
        let cadence = RankingCadence::for_kind(ranker.kind());
        Self::new(
            ranker,
            BacktestConfig {
                holding,
                cadence,
                seasonal,
            },
        )
    }

    /// Individual momentum engine (ranks once per evaluation date).
    pub fn momentum(ranker: MomentumRanker, holding: usize, seasonal: SeasonalFilter) -> Self {
        Self::for_ranker(Box::new(ranker), holding, seasonal)
    }

    /// Industry momentum engine (re-ranks at every holding offset).
    pub fn industry_momentum(
        ranker: IndustryMomentumRanker,
        holding: usize,
        seasonal: SeasonalFilter,
    ) -> Self {
        Self::for_ranker(Box::new(ranker), holding, seasonal)
    }

    /// 52-week high engine (ranks once per evaluation date).
    pub fn year_high(ranker: YearHighRanker, holding: usize, seasonal: SeasonalFilter) -> Self {
        Self::for_ranker(Box::new(ranker), holding, seasonal)
    }

    /// The engine's ranker.
    pub fn ranker(&self) -> &dyn Ranker {
        self.ranker.as_ref()
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// First evaluation index, `2J + 1`.
    pub fn evaluation_start(&self) -> usize {
        2 * self.ranker.lookback() + 1
    }

    /// Display label of the strategy.
    pub fn strategy_name(&self) -> String {
        let base = match self.ranker.kind() {
            SignalKind::Momentum => "Individual stock momentum",
            SignalKind::IndustryMomentum => "Industry momentum",
            SignalKind::YearHigh => "52-week high",
        };
        let suffix = match self.config.seasonal {
            SeasonalFilter::All => "",
            SeasonalFilter::ExcludeSeasonal => " (seasonal month excluded)",
            SeasonalFilter::SeasonalOnly => " (seasonal month only)",
        };
        format!(
            "{base} J={} K={}{suffix}",
            self.ranker.lookback(),
            self.config.holding
        )
    }

    /// Run the backtest and aggregate it.
    ///
    /// # Returns
    ///
    /// Mean winner, loser and winner-minus-loser returns across evaluation
    /// dates, the latter with its t-statistic.
    ///
    /// # Errors
    ///
    /// See [`Backtest::run_series`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let result = backtest.run(&market_data)?;
    /// println!("Winner - Loser: {}", result.spread.percent_with_stat());
    /// ```
    pub fn run(&self, data: &MarketData) -> Result<StrategyResult> {
        let series = self.run_series(data)?;
        let result = series.summarize(self.strategy_name());
        tracing::info!(
            strategy = %result.strategy,
            periods = result.n_periods,
            spread = result.spread.mean,
            t_stat = result.spread.stat,
            "backtest complete"
        );
        Ok(result)
    }

    /// Walk every evaluation index and return the per-date series.
    ///
    /// For each `t` from `2J+1` to the last row, every holding offset
    /// `i` in `[t-K-1, t-1)` adds the mean return at `t` of the winners and
    /// of the losers, and their difference. A date excluded by the seasonal
    /// filter contributes zeros. An empty bucket contributes `NaN`, which
    /// the aggregation skips.
    ///
    /// # Errors
    ///
    /// - [`ShirazError::InsufficientData`] if `K > 2J`, which would put the
    ///   holding window before the start of the series
    /// - any ranker error, e.g. [`ShirazError::IndexOutOfRange`] when an
    ///   offset's ranking window falls before the first row
    pub fn run_series(&self, data: &MarketData) -> Result<BacktestSeries> {
        let lookback = self.ranker.lookback();
        let holding = self.config.holding;
        if holding > 2 * lookback {
            return Err(ShirazError::InsufficientData(format!(
                "holding period {holding} exceeds twice the lookback {lookback}"
            )));
        }

        let positions: HashMap<&str, usize> = data
            .symbols()
            .iter()
            .enumerate()
            .map(|(j, s)| (s.as_str(), j))
            .collect();
        let returns = data.returns().values();
        let bucket_means = |partition: &BucketPartition, t: usize| -> (f64, f64) {
            let mean_at = |symbols: &[String]| {
                nan_mean(
                    symbols
                        .iter()
                        .filter_map(|s| positions.get(s.as_str()))
                        .map(|&j| returns[[t, j]]),
                )
            };
            (mean_at(&partition.winners), mean_at(&partition.losers))
        };

        let start = self.evaluation_start();
        let n = data.n_periods();
        let mut series = BacktestSeries::default();

        for t in start..n {
            let date = data.dates()[t];
            let (mut winner, mut loser, mut spread) = (0.0, 0.0, 0.0);

            if self.config.seasonal.includes(&date) {
                let offsets = (t - holding - 1)..(t - 1);
                match self.config.cadence {
                    RankingCadence::PerEvaluation => {
                        let partition = self.ranker.rank(data, t)?;
                        let (w, l) = bucket_means(&partition, t);
                        for _ in offsets {
                            winner += w;
                            loser += l;
                            spread += w - l;
                        }
                    }
                    RankingCadence::PerHoldingOffset => {
                        for i in offsets {
                            let partition = self.ranker.rank(data, i)?;
                            let (w, l) = bucket_means(&partition, t);
                            winner += w;
                            loser += l;
                            spread += w - l;
                        }
                    }
                }
            }

            tracing::debug!(%date, t, winner, loser, spread, "evaluation date");
            series.dates.push(date);
            series.winner.push(winner);
            series.loser.push(loser);
            series.spread.push(spread);
        }

        Ok(series)
    }
}
