//! Market-cap liquidity filter.
//!
//! Before any return-based split, instruments whose average market cap over
//! the ranking window sits below a low percentile are removed. Instruments
//! with any missing market cap in the window are never eligible.

use ndarray::s;
use serde::{Deserialize, Serialize};
use shiraz_traits::{
    Panel, Result, ShirazError,
    stats::{complete_mean, quantile},
};
use std::ops::RangeInclusive;

/// Configuration for the liquidity filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityFilter {
    /// Percentile of windowed mean market cap an instrument must reach (default: 0.10).
    pub percentile: f64,
}

impl Default for LiquidityFilter {
    fn default() -> Self {
        Self { percentile: 0.10 }
    }
}

impl LiquidityFilter {
    /// Create a filter with the given percentile.
    #[must_use]
    pub const fn new(percentile: f64) -> Self {
        Self { percentile }
    }

    /// Column positions of the liquid instruments over `rows`.
    ///
    /// The mean market cap over the window is computed for every instrument
    /// with a complete window; those at or above the configured percentile
    /// of these means are returned, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::IndexOutOfRange`] if the window ends past the
    /// last row.
    pub fn liquid_columns(&self, caps: &Panel, rows: RangeInclusive<usize>) -> Result<Vec<usize>> {
        let (start, end) = (*rows.start(), *rows.end());
        if end >= caps.n_rows() {
            return Err(ShirazError::out_of_range(end, caps.n_rows()));
        }
        let window = caps.values().slice(s![start..=end, ..]);

        let means: Vec<(usize, f64)> = window
            .columns()
            .into_iter()
            .enumerate()
            .filter_map(|(j, column)| complete_mean(column.iter().copied()).map(|m| (j, m)))
            .collect();

        let threshold = quantile(means.iter().map(|(_, m)| *m), self.percentile);
        Ok(means
            .into_iter()
            .filter(|(_, m)| *m >= threshold)
            .map(|(j, _)| j)
            .collect())
    }
}
