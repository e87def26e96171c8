//! Ranker registry for discovering and building the available rankers.
//!
//! This module provides metadata for the three rankers and a small factory
//! that turns a [`SignalKind`] plus a lookback into a boxed [`Ranker`].

use crate::{
    liquidity::LiquidityFilter,
    momentum::{IndustryMomentumRanker, MomentumConfig, MomentumRanker},
    year_high::{Orientation, YearHighConfig, YearHighRanker},
};
use serde::{Deserialize, Serialize};
use shiraz_traits::{IndustryMembership, Ranker, Result, ShirazError, SignalKind};
use std::sync::Arc;

/// Panels a ranker reads besides returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredPanel {
    /// Market capitalization (liquidity filter)
    MarketCap,
    /// Industry aggregate returns plus the membership map
    IndustryReturns,
    /// Monthly price-to-trailing-high ratios
    Proximity,
}

/// Metadata about a ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerInfo {
    /// Unique identifier for the ranker
    pub name: &'static str,

    /// Signal implemented
    pub kind: SignalKind,

    /// Human-readable description
    pub description: &'static str,

    /// Typical lookback J in months
    pub typical_lookback: usize,

    /// Whether the backtest engine re-ranks at every holding offset
    pub reranks_per_offset: bool,

    /// Panels the ranker needs
    pub requires: Vec<RequiredPanel>,
}

/// Get information about all available rankers.
#[must_use]
pub fn available_rankers() -> Vec<RankerInfo> {
    vec![
        RankerInfo {
            name: "momentum",
            kind: SignalKind::Momentum,
            description: "Mean return over [t-J, t-1] on the liquid universe",
            typical_lookback: 6,
            reranks_per_offset: false,
            requires: vec![RequiredPanel::MarketCap],
        },
        RankerInfo {
            name: "industry_momentum",
            kind: SignalKind::IndustryMomentum,
            description: "Mean industry return over [t-J, t-1], mapped to constituents",
            typical_lookback: 6,
            reranks_per_offset: true,
            requires: vec![RequiredPanel::IndustryReturns],
        },
        RankerInfo {
            name: "year_high",
            kind: SignalKind::YearHigh,
            description: "Price relative to the trailing 52-week high at t-1",
            typical_lookback: 6,
            reranks_per_offset: false,
            requires: vec![RequiredPanel::MarketCap, RequiredPanel::Proximity],
        },
    ]
}

/// Get information about a ranker by name or signal alias (e.g. `JT`, `52w`).
#[must_use]
pub fn get_ranker_info(name: &str) -> Option<RankerInfo> {
    let kind = name.parse::<SignalKind>().ok();
    available_rankers()
        .into_iter()
        .find(|info| info.name == name || Some(info.kind) == kind)
}

/// Builds boxed rankers for a signal kind and lookback.
///
/// The industry momentum ranker needs a membership map; building it
/// without one is an error.
#[derive(Debug, Clone, Default)]
pub struct RankerFactory {
    membership: Option<Arc<IndustryMembership>>,
    orientation: Orientation,
    liquidity: LiquidityFilter,
}

impl RankerFactory {
    /// Create a factory with default settings and no membership map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the membership map used by industry momentum rankers.
    #[must_use]
    pub fn with_membership(mut self, membership: Arc<IndustryMembership>) -> Self {
        self.membership = Some(membership);
        self
    }

    /// Set the orientation of year-high rankers.
    #[must_use]
    pub const fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the liquidity filter of momentum and year-high rankers.
    #[must_use]
    pub const fn with_liquidity(mut self, liquidity: LiquidityFilter) -> Self {
        self.liquidity = liquidity;
        self
    }

    /// The configured year-high orientation.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Build a ranker of `kind` with lookback `lookback`.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::InvalidData`] when an industry ranker is
    /// requested without a membership map.
    pub fn build(&self, kind: SignalKind, lookback: usize) -> Result<Box<dyn Ranker>> {
        Ok(match kind {
            SignalKind::Momentum => Box::new(MomentumRanker::new(MomentumConfig {
                lookback,
                liquidity: self.liquidity,
            })),
            SignalKind::IndustryMomentum => {
                let membership = self.membership.clone().ok_or_else(|| {
                    ShirazError::InvalidData(
                        "industry momentum requires a membership map".to_string(),
                    )
                })?;
                Box::new(IndustryMomentumRanker::with_lookback(lookback, membership))
            }
            SignalKind::YearHigh => Box::new(YearHighRanker::new(YearHighConfig {
                lookback,
                orientation: self.orientation,
                liquidity: self.liquidity,
            })),
        })
    }
}
