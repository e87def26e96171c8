//! Ranker trait and bucket partitions.
//!
//! A ranker splits the eligible universe at one evaluation index into
//! winners, losers and middles. Rankers are pure: calling one twice with the
//! same data and index yields the same partition.

use crate::{MarketData, Result, ShirazError, Symbol};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// Quantile at or above which an instrument is a winner.
pub const WINNER_QUANTILE: f64 = 0.7;

/// Quantile at or below which an instrument is a loser.
pub const LOSER_QUANTILE: f64 = 0.3;

/// One of the three buckets of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Top tail of the signal.
    Winners,
    /// Everything eligible that is in neither tail.
    Middles,
    /// Bottom tail of the signal.
    Losers,
}

impl Bucket {
    /// Buckets in presentation order.
    pub const ALL: [Self; 3] = [Self::Winners, Self::Middles, Self::Losers];

    /// Singular display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Winners => "Winner",
            Self::Middles => "Middle",
            Self::Losers => "Loser",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The ranking signal a ranker implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Individual-stock momentum.
    Momentum,
    /// Industry momentum.
    IndustryMomentum,
    /// Proximity to the trailing 52-week high (or low).
    YearHigh,
}

impl SignalKind {
    /// All signals, in label-column order.
    pub const ALL: [Self; 3] = [Self::Momentum, Self::IndustryMomentum, Self::YearHigh];

    /// Prefix of this signal's label columns.
    pub const fn label_prefix(&self) -> &'static str {
        match self {
            Self::Momentum => "J",
            Self::IndustryMomentum => "M",
            Self::YearHigh => "FH",
        }
    }

    /// Short code used in composition names (e.g. `JT_FT`).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Momentum => "JT",
            Self::IndustryMomentum => "MG",
            Self::YearHigh => "FT",
        }
    }

    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Momentum => "momentum",
            Self::IndustryMomentum => "industry",
            Self::YearHigh => "high",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = ShirazError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "momentum" | "mom" | "jt" | "j" => Ok(Self::Momentum),
            "industry" | "industry-momentum" | "mg" | "m" => Ok(Self::IndustryMomentum),
            "high" | "year-high" | "52w" | "ft" | "fh" => Ok(Self::YearHigh),
            other => Err(ShirazError::InvalidData(format!("unknown signal '{other}'"))),
        }
    }
}

/// Winners, losers and middles at one evaluation index.
///
/// The three collections are disjoint and ordered by the source panel's
/// column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketPartition {
    /// Instruments in the top tail.
    pub winners: Vec<Symbol>,
    /// Instruments in the bottom tail.
    pub losers: Vec<Symbol>,
    /// Remaining eligible instruments.
    pub middles: Vec<Symbol>,
}

impl BucketPartition {
    /// Creates a partition from its three buckets.
    pub const fn new(winners: Vec<Symbol>, losers: Vec<Symbol>, middles: Vec<Symbol>) -> Self {
        Self {
            winners,
            losers,
            middles,
        }
    }

    /// Members of `bucket`.
    pub fn bucket(&self, bucket: Bucket) -> &[Symbol] {
        match bucket {
            Bucket::Winners => &self.winners,
            Bucket::Middles => &self.middles,
            Bucket::Losers => &self.losers,
        }
    }

    /// The bucket holding `symbol`, if any.
    pub fn bucket_of(&self, symbol: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|&b| self.bucket(b).iter().any(|s| s == symbol))
    }

    /// A symbol → bucket lookup table.
    pub fn index(&self) -> HashMap<Symbol, Bucket> {
        Bucket::ALL
            .into_iter()
            .flat_map(|b| self.bucket(b).iter().map(move |s| (s.clone(), b)))
            .collect()
    }

    /// Total number of eligible instruments.
    pub fn len(&self) -> usize {
        self.winners.len() + self.losers.len() + self.middles.len()
    }

    /// Whether no instrument is eligible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cross-sectional winner/loser ranker.
///
/// `t` is a zero-based row position into the data's date index.
/// Implementations must be deterministic and free of hidden state.
pub trait Ranker: Send + Sync + fmt::Debug {
    /// Returns the name of this ranker.
    fn name(&self) -> &str;

    /// The signal this ranker implements.
    fn kind(&self) -> SignalKind;

    /// Lookback length J in periods.
    fn lookback(&self) -> usize;

    /// Partitions the eligible universe at row `t`.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::IndexOutOfRange`] when `t` or its lookback
    /// window falls outside the series, and a structural error when the data
    /// lacks a panel this ranker needs.
    fn rank(&self, data: &MarketData, t: usize) -> Result<BucketPartition>;
}
