//! Strategy result types.
//!
//! Results are carried as numbers throughout. Percent strings with the
//! t-statistic in parentheses are produced only by the display helpers here.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shiraz_traits::{
    Result,
    stats::{Ddof, nan_mean, t_statistic},
};
use std::fmt;

/// A mean with its t-statistic.
///
/// `stat` is `NaN` when undefined (zero variance, or not computed for this
/// quantity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanStat {
    /// Arithmetic mean over the finite observations
    pub mean: f64,
    /// `mean * sqrt(n) / std`, or `NaN`
    pub stat: f64,
}

impl MeanStat {
    /// Mean and t-statistic of a series.
    pub fn from_series(values: &[f64], ddof: Ddof) -> Self {
        Self {
            mean: nan_mean(values.iter().copied().filter(|x| x.is_finite())),
            stat: t_statistic(values, ddof),
        }
    }

    /// Mean of a series, without a t-statistic.
    pub fn mean_only(values: &[f64]) -> Self {
        Self {
            mean: nan_mean(values.iter().copied().filter(|x| x.is_finite())),
            stat: f64::NAN,
        }
    }

    /// The mean as a percentage with two decimals, e.g. `1.23%`.
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.mean * 100.0)
    }

    /// The mean as a percentage followed by the t-statistic, e.g. `1.23%  (2.10)`.
    pub fn percent_with_stat(&self) -> String {
        format!("{}  ({})", self.percent(), format_stat(self.stat))
    }
}

/// Formats a t-statistic with two decimals, `n/a` when undefined.
pub fn format_stat(stat: f64) -> String {
    if stat.is_finite() {
        format!("{stat:.2}")
    } else {
        "n/a".to_string()
    }
}

/// Summary of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Strategy label
    pub strategy: String,
    /// Mean winner portfolio return
    pub winner: MeanStat,
    /// Mean loser portfolio return
    pub loser: MeanStat,
    /// Mean winner-minus-loser return with its t-statistic
    pub spread: MeanStat,
    /// Number of evaluation dates
    pub n_periods: usize,
}

impl StrategyResult {
    /// Aggregates per-date winner, loser and spread series.
    ///
    /// Means are taken over finite entries; the spread t-statistic uses the
    /// population standard deviation.
    pub fn from_series(
        strategy: impl Into<String>,
        winner: &[f64],
        loser: &[f64],
        spread: &[f64],
    ) -> Self {
        Self {
            strategy: strategy.into(),
            winner: MeanStat::mean_only(winner),
            loser: MeanStat::mean_only(loser),
            spread: MeanStat::from_series(spread, Ddof::Population),
            n_periods: spread.len(),
        }
    }

    /// Display cells: winner, loser and spread with its t-statistic.
    pub fn display_row(&self) -> [String; 3] {
        [
            self.winner.percent(),
            self.loser.percent(),
            self.spread.percent_with_stat(),
        ]
    }

    /// Numeric DataFrame of several results, one row per strategy.
    ///
    /// # Errors
    ///
    /// Propagates polars construction errors.
    pub fn to_dataframe(results: &[Self]) -> Result<DataFrame> {
        let df = df! {
            "strategy" => results.iter().map(|r| r.strategy.clone()).collect::<Vec<_>>(),
            "winner" => results.iter().map(|r| r.winner.mean).collect::<Vec<_>>(),
            "loser" => results.iter().map(|r| r.loser.mean).collect::<Vec<_>>(),
            "winner_minus_loser" => results.iter().map(|r| r.spread.mean).collect::<Vec<_>>(),
            "t_stat" => results.iter().map(|r| r.spread.stat).collect::<Vec<_>>(),
            "n_periods" => results.iter().map(|r| r.n_periods as u64).collect::<Vec<_>>(),
        }?;
        Ok(df)
    }
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [winner, loser, spread] = self.display_row();
        write!(
            f,
            "{}: Winner {winner}, Loser {loser}, Winner - Loser {spread}",
            self.strategy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_stat_formatting() {
        let m = MeanStat {
            mean: 0.012345,
            stat: 2.104,
        };
        assert_eq!(m.percent(), "1.23%");
        assert_eq!(m.percent_with_stat(), "1.23%  (2.10)");

        let undefined = MeanStat {
            mean: 0.08,
            stat: f64::NAN,
        };
        assert_eq!(undefined.percent_with_stat(), "8.00%  (n/a)");
    }

    #[test]
    fn test_from_series_skips_non_finite() {
        let r = StrategyResult::from_series(
            "test",
            &[0.05, f64::NAN, 0.05],
            &[-0.03, -0.03, -0.03],
            &[0.08, f64::NAN, 0.08],
        );
        assert_relative_eq!(r.winner.mean, 0.05);
        assert_relative_eq!(r.loser.mean, -0.03);
        assert_relative_eq!(r.spread.mean, 0.08);
        assert!(r.spread.stat.is_nan());
        assert!(r.winner.stat.is_nan());
        assert_eq!(r.n_periods, 3);
    }

    #[test]
    fn test_spread_stat_uses_population_std() {
        let spread = [0.01, 0.03];
        let r = StrategyResult::from_series("test", &spread, &spread, &spread);
        // mean 0.02, population std 0.01, sqrt(2)
        assert_relative_eq!(r.spread.stat, 0.02 * 2.0_f64.sqrt() / 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_to_dataframe() {
        let r = StrategyResult::from_series("a", &[0.01], &[0.0], &[0.01]);
        let df = StrategyResult::to_dataframe(&[r.clone(), r]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
    }

    #[test]
    fn test_serde_round_trip() {
        let r = StrategyResult::from_series("a", &[0.01, 0.02], &[0.0, 0.01], &[0.01, 0.01]);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"strategy\":\"a\""));
    }
}
