//! Momentum rankers based on trailing average returns.
//!
//! This module provides two rankers over a lookback window `[t-J, t-1]`:
//! - Individual: each liquid instrument's own average return
//! - Industry: the average return of each industry, mapped back to its
//!   constituents through an explicit membership map
//!
//! Both split the signal at its 70th and 30th percentile, inclusive on
//! both sides.

mod individual;
mod industry;

pub use individual::{MomentumConfig, MomentumRanker};
pub use industry::{IndustryMomentumConfig, IndustryMomentumRanker};

use shiraz_traits::{
    LOSER_QUANTILE, Result, ShirazError, Symbol, WINNER_QUANTILE, stats::quantile,
};

/// Start row `t - lookback` of a ranking window, checking `t` itself.
pub(crate) fn window_start(t: usize, lookback: usize, n_rows: usize) -> Result<usize> {
    if lookback == 0 {
        return Err(ShirazError::InvalidData("lookback must be at least 1".to_string()));
    }
    if t >= n_rows {
        return Err(ShirazError::out_of_range(t, n_rows));
    }
    t.checked_sub(lookback).ok_or_else(|| {
        ShirazError::out_of_range(t as i64 - lookback as i64, n_rows)
    })
}

/// Splits `(key, signal)` pairs into the top and bottom tails.
///
/// Thresholds are the 70th / 30th percentile of the signal values given.
/// A key meeting both thresholds (only possible for a near-constant signal)
/// is kept as a winner so the tails stay disjoint.
pub(crate) fn split_tails<K: Copy>(signal: &[(K, f64)]) -> (Vec<K>, Vec<K>) {
    let upper = quantile(signal.iter().map(|(_, v)| *v), WINNER_QUANTILE);
    let lower = quantile(signal.iter().map(|(_, v)| *v), LOSER_QUANTILE);
    let mut winners = Vec::new();
    let mut losers = Vec::new();
    for &(key, value) in signal {
        if value >= upper {
            winners.push(key);
        } else if value <= lower {
            losers.push(key);
        }
    }
    (winners, losers)
}

/// Names the columns at the given positions.
pub(crate) fn symbols_at(columns: &[Symbol], positions: &[usize]) -> Vec<Symbol> {
    positions.iter().map(|&j| columns[j].clone()).collect()
}
