//! Two-pass Fama-MacBeth premium estimation.
//!
//! Stage 1 regresses, per instrument, each period's return on the previous
//! period's size and return, the lagged winner/loser labels and an
//! intercept. Stage 2 regresses, per date, the cross-section of returns on
//! the stage-1 coefficient vectors. The premium of a regressor is the mean
//! of its stage-2 coefficient across dates.

use crate::{
    labels::{LabelBuilder, LabelSpec},
    metrics::MeanStat,
    regression::ols,
};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shiraz_signals::{Orientation, RankerFactory};
use shiraz_traits::{LocalDate, MarketData, Result, ShirazError, Symbol, stats::Ddof};

/// Configuration for premium estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumConfig {
    /// Lookback J of every ranker; labels cover lags 2..=J+1 (default: 6)
    pub lags: usize,
    /// Extra offset applied to every label row: labels for the regressor row
    /// at `r` are taken at `r - lag` (default: 0)
    pub lag: usize,
    /// Drop the seasonal month from every panel before estimating
    pub exclude_seasonal: bool,
    /// Tail of the proximity ranker used for the FH labels
    pub orientation: Orientation,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            lags: 6,
            lag: 0,
            exclude_seasonal: false,
            orientation: Orientation::High,
        }
    }
}

/// Mean premium of one regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premium {
    /// Regressor name
    pub regressor: String,
    /// Mean premium and `mean * sqrt(n) / std` (sample std), where `n`
    /// counts only the dates with a finite premium
    pub premium: MeanStat,
    /// Dates with a finite premium for this regressor
    pub n_dates: usize,
}

/// Degenerate cases met during estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PremiumDiagnostics {
    /// Instruments with a stage-1 fit
    pub instruments_fitted: usize,
    /// Instruments without any complete stage-1 observation
    pub instruments_skipped: Vec<Symbol>,
    /// Stage-1 fits with unidentified regressors (coefficient set to 0)
    pub rank_deficient: Vec<(Symbol, Vec<String>)>,
    /// Dates with a stage-2 fit
    pub dates_fitted: usize,
    /// Dates with fewer instruments than regressors
    pub dates_skipped: Vec<LocalDate>,
}

/// Premiums for every regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumTable {
    /// "Seasonal month included" or "Seasonal month excluded"
    pub label: String,
    /// One entry per regressor, in regression order
    pub premiums: Vec<Premium>,
    /// What had to be dropped or left unidentified
    pub diagnostics: PremiumDiagnostics,
}

impl PremiumTable {
    /// Premium of a regressor by name.
    pub fn get(&self, regressor: &str) -> Option<&Premium> {
        self.premiums.iter().find(|p| p.regressor == regressor)
    }

    /// DataFrame with one row per regressor.
    ///
    /// # Errors
    ///
    /// Propagates polars construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df! {
            "regressor" => self.premiums.iter().map(|p| p.regressor.clone()).collect::<Vec<_>>(),
            "premium" => self.premiums.iter().map(|p| p.premium.mean).collect::<Vec<_>>(),
            "t_stat" => self.premiums.iter().map(|p| p.premium.stat).collect::<Vec<_>>(),
            "n_dates" => self.premiums.iter().map(|p| p.n_dates as u64).collect::<Vec<_>>(),
        }?;
        Ok(df)
    }
}

/// Fama-MacBeth estimator.
#[derive(Debug, Clone, Default)]
pub struct FamaMacBeth {
    config: PremiumConfig,
}

impl FamaMacBeth {
    /// Create an estimator with the given configuration.
    pub const fn new(config: PremiumConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub const fn config(&self) -> &PremiumConfig {
        &self.config
    }

    /// Regressor names: `size`, `R_t-1`, the label columns, `Intercept`.
    pub fn regressors(&self) -> Vec<String> {
        let mut names = vec!["size".to_string(), "R_t-1".to_string()];
        names.extend(LabelSpec::new(self.config.lags).columns());
        names.push("Intercept".to_string());
        names
    }

    /// Estimates the premium table.
    ///
    /// `factory` must carry the industry membership map; its orientation is
    /// overridden by [`PremiumConfig::orientation`].
    ///
    /// # Errors
    ///
    /// - [`ShirazError::InsufficientData`] if no instrument or no date can be fitted
    /// - ranker errors, e.g. a missing industry or proximity panel
    pub fn estimate(&self, data: &MarketData, factory: &RankerFactory) -> Result<PremiumTable> {
        let seasonal_free;
        let data = if self.config.exclude_seasonal {
            seasonal_free = data.without_seasonal_month()?;
            &seasonal_free
        } else {
            data
        };

        let factory = factory.clone().with_orientation(self.config.orientation);
        let mut labels = LabelBuilder::new(data, &factory, LabelSpec::new(self.config.lags))?;
        let regressors = self.regressors();
        let mut diagnostics = PremiumDiagnostics::default();

        let coefficients =
            self.time_series_stage(data, &mut labels, &regressors, &mut diagnostics)?;
        if coefficients.iter().all(Option::is_none) {
            return Err(ShirazError::InsufficientData(
                "no instrument has a complete stage-1 observation".to_string(),
            ));
        }

        let premiums =
            cross_section_stage(data, &coefficients, regressors.len(), &mut diagnostics)?;
        if diagnostics.dates_fitted == 0 {
            return Err(ShirazError::InsufficientData(format!(
                "no date has at least {} instruments with stage-1 coefficients",
                regressors.len()
            )));
        }

        let premiums = summarize(regressors, &premiums);

        let label = if self.config.exclude_seasonal {
            "Seasonal month excluded"
        } else {
            "Seasonal month included"
        };
        tracing::info!(
            label,
            instruments = diagnostics.instruments_fitted,
            dates = diagnostics.dates_fitted,
            "fama-macbeth complete"
        );

        Ok(PremiumTable {
            label: label.to_string(),
            premiums,
            diagnostics,
        })
    }

    /// Stage 1: one coefficient vector per instrument (`None` when unfitted).
    fn time_series_stage(
        &self,
        data: &MarketData,
        labels: &mut LabelBuilder<'_>,
        regressors: &[String],
        diagnostics: &mut PremiumDiagnostics,
    ) -> Result<Vec<Option<Vec<f64>>>> {
        let width = regressors.len();
        let mut out = Vec::with_capacity(data.symbols().len());

        for (j, symbol) in data.symbols().iter().enumerate() {
            let Some((y, x)) = self.stage_one_design(data, labels, j, width)? else {
                diagnostics.instruments_skipped.push(symbol.clone());
                out.push(None);
                continue;
            };

            match ols(y.view(), x.view()) {
                Ok(fit) => {
                    if !fit.is_full_rank() {
                        let names = fit
                            .rank_deficient
                            .iter()
                            .map(|&c| regressors[c].clone())
                            .collect();
                        diagnostics.rank_deficient.push((symbol.clone(), names));
                    }
                    tracing::debug!(%symbol, n_obs = fit.n_obs, "stage-1 fit");
                    diagnostics.instruments_fitted += 1;
                    out.push(Some(fit.coefficients));
                }
                Err(ShirazError::Regression(reason)) => {
                    tracing::debug!(%symbol, %reason, "stage-1 skipped");
                    diagnostics.instruments_skipped.push(symbol.clone());
                    out.push(None);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Stage-1 response and design of instrument `j`.
    ///
    /// Row `k` pairs consecutive rows `prev < curr` where both return and
    /// market cap are present: the response is the return at `curr`, the
    /// regressors are size and return at `prev`, the label row at
    /// `prev - lag` and an intercept. Unavailable labels are `NaN`.
    /// Returns `None` with fewer than two present rows.
    fn stage_one_design(
        &self,
        data: &MarketData,
        labels: &mut LabelBuilder<'_>,
        j: usize,
        width: usize,
    ) -> Result<Option<(Array1<f64>, Array2<f64>)>> {
        let returns = data.returns().values();
        let caps = data.market_caps().values();
        let symbol = &data.symbols()[j];
        let present: Vec<usize> = (0..data.n_periods())
            .filter(|&r| returns[[r, j]].is_finite() && caps[[r, j]].is_finite())
            .collect();
        if present.len() < 2 {
            return Ok(None);
        }

        let n_obs = present.len() - 1;
        let mut x = Array2::from_elem((n_obs, width), f64::NAN);
        let mut y = Array1::from_elem(n_obs, f64::NAN);
        for (k, pair) in present.windows(2).enumerate() {
            let (prev, curr) = (pair[0], pair[1]);
            y[k] = returns[[curr, j]];
            x[[k, 0]] = caps[[prev, j]];
            x[[k, 1]] = returns[[prev, j]];
            x[[k, width - 1]] = 1.0;
            let row = match prev.checked_sub(self.config.lag) {
                Some(at) => labels.row(symbol, at)?,
                None => None,
            };
            if let Some(row) = row {
                for (c, v) in row.into_iter().enumerate() {
                    x[[k, 2 + c]] = v;
                }
            }
        }
        Ok(Some((y, x)))
    }
}

/// Mean premium of every regressor over the per-date premium rows.
fn summarize(regressors: Vec<String>, premiums: &[Vec<f64>]) -> Vec<Premium> {
    regressors
        .into_iter()
        .enumerate()
        .map(|(k, regressor)| {
            let series: Vec<f64> = premiums.iter().map(|row| row[k]).collect();
            Premium {
                regressor,
                premium: MeanStat::from_series(&series, Ddof::Sample),
                n_dates: series.iter().filter(|v| v.is_finite()).count(),
            }
        })
        .collect()
}

/// Stage 2: one premium vector per fitted date.
///
/// Regressors the cross-section cannot identify at a date get `NaN` for that
/// date instead of a fabricated zero.
fn cross_section_stage(
    data: &MarketData,
    coefficients: &[Option<Vec<f64>>],
    width: usize,
    diagnostics: &mut PremiumDiagnostics,
) -> Result<Vec<Vec<f64>>> {
    let returns = data.returns().values();
    let mut premiums = Vec::new();

    for (t, date) in data.dates().iter().enumerate() {
        let members: Vec<(f64, &Vec<f64>)> = coefficients
            .iter()
            .enumerate()
            .filter_map(|(j, c)| {
                let r = returns[[t, j]];
                c.as_ref().filter(|_| r.is_finite()).map(|c| (r, c))
            })
            .collect();
        if members.len() < width {
            diagnostics.dates_skipped.push(*date);
            continue;
        }

        let y = Array1::from_iter(members.iter().map(|(r, _)| *r));
        let mut x = Array2::zeros((members.len(), width));
        for (i, (_, c)) in members.iter().enumerate() {
            for (k, v) in c.iter().enumerate() {
                x[[i, k]] = *v;
            }
        }

        let fit = ols(y.view(), x.view())?;
        let mut row = fit.coefficients;
        for &k in &fit.rank_deficient {
            row[k] = f64::NAN;
        }
        diagnostics.dates_fitted += 1;
        premiums.push(row);
    }
    Ok(premiums)
}
