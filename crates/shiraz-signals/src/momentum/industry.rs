//! Industry momentum ranker.

use super::{split_tails, window_start};
use serde::{Deserialize, Serialize};
use shiraz_traits::{
    BucketPartition, IndustryMembership, MarketData, Ranker, Result, ShirazError, SignalKind,
    stats::nan_mean,
};
use std::{collections::HashSet, sync::Arc};

/// Configuration for the industry momentum ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryMomentumConfig {
    /// Number of periods J in the ranking window (default: 6)
    pub lookback: usize,
}

impl Default for IndustryMomentumConfig {
    fn default() -> Self {
        Self { lookback: 6 }
    }
}

/// Industry momentum ranker.
///
/// Industries are ranked on their mean return over `[t-J, t-1]`, skipping
/// missing periods and leaving out industries with no observation in the
/// window. The constituents of the top-tail industries that appear in the
/// return panel are the winners, those of the bottom-tail industries the
/// losers, and every other instrument in the return panel is a middle.
/// There is no instrument-level liquidity filter.
#[derive(Debug, Clone)]
pub struct IndustryMomentumRanker {
    config: IndustryMomentumConfig,
    membership: Arc<IndustryMembership>,
}

impl IndustryMomentumRanker {
    /// Create a new industry momentum ranker over the given membership map.
    #[must_use]
    pub const fn new(config: IndustryMomentumConfig, membership: Arc<IndustryMembership>) -> Self {
        Self { config, membership }
    }

    /// Create a ranker with the given lookback.
    #[must_use]
    pub const fn with_lookback(lookback: usize, membership: Arc<IndustryMembership>) -> Self {
        Self::new(IndustryMomentumConfig { lookback }, membership)
    }

    /// The membership map this ranker resolves industries with.
    #[must_use]
    pub fn membership(&self) -> &IndustryMembership {
        &self.membership
    }

    /// Ranks industries at row `t`, returning `(winner, loser)` industry names.
    ///
    /// # Errors
    ///
    /// Fails when no industry panel is attached, when `t` or its window is
    /// out of range, and with [`ShirazError::UnknownIndustry`] for an
    /// industry column absent from the membership map.
    pub fn rank_industries<'a>(
        &self,
        data: &'a MarketData,
        t: usize,
    ) -> Result<(Vec<&'a str>, Vec<&'a str>)> {
        let industries = data.require_industry_returns()?;
        let start = window_start(t, self.config.lookback, industries.n_rows())?;

        if let Some(unknown) = industries.columns().iter().find(|c| !self.membership.contains(c)) {
            return Err(ShirazError::UnknownIndustry(unknown.clone()));
        }

        let values = industries.values();
        let signal: Vec<(usize, f64)> = (0..industries.n_cols())
            .map(|j| (j, nan_mean((start..t).map(|i| values[[i, j]]))))
            .filter(|(_, m)| !m.is_nan())
            .collect();

        let (winners, losers) = split_tails(&signal);
        let names = industries.columns();
        Ok((
            winners.iter().map(|&j| names[j].as_str()).collect(),
            losers.iter().map(|&j| names[j].as_str()).collect(),
        ))
    }
}

impl Ranker for IndustryMomentumRanker {
    fn name(&self) -> &str {
        "industry_momentum"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::IndustryMomentum
    }

    fn lookback(&self) -> usize {
        self.config.lookback
    }

    fn rank(&self, data: &MarketData, t: usize) -> Result<BucketPartition> {
        let (winner_industries, loser_industries) = self.rank_industries(data, t)?;

        let constituents = |industries: &[&str]| -> HashSet<&str> {
            industries
                .iter()
                .filter_map(|name| self.membership.constituents(name))
                .flatten()
                .map(String::as_str)
                .collect()
        };
        let winner_set = constituents(&winner_industries);
        let loser_set = constituents(&loser_industries);

        let mut partition = BucketPartition::default();
        for symbol in data.symbols() {
            if winner_set.contains(symbol.as_str()) {
                partition.winners.push(symbol.clone());
            } else if loser_set.contains(symbol.as_str()) {
                partition.losers.push(symbol.clone());
            } else {
                partition.middles.push(symbol.clone());
            }
        }

        tracing::trace!(
            t,
            winner_industries = winner_industries.len(),
            loser_industries = loser_industries.len(),
            winners = partition.winners.len(),
            losers = partition.losers.len(),
            "ranked industry momentum"
        );
        Ok(partition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiraz_traits::{LocalDate, Panel};

    fn dates(n: usize) -> Vec<LocalDate> {
        (0..n)
            .map(|i| LocalDate::new(1400, i as u32 + 1, 1).unwrap())
            .collect()
    }

    fn membership() -> Arc<IndustryMembership> {
        Arc::new(
            IndustryMembership::new([
                ("Banking", vec!["A".to_string(), "B".to_string()]),
                ("Cement", vec!["C".to_string(), "Z".to_string()]),
                ("Steel", vec!["D".to_string()]),
                ("Sugar", vec!["E".to_string(), "A".to_string()]),
            ])
            .unwrap(),
        )
    }

    fn market(industry_columns: Vec<(String, Vec<f64>)>) -> MarketData {
        let n = 5;
        let symbols = ["A", "B", "C", "D", "E", "F"];
        let returns = symbols.iter().map(|s| (s.to_string(), vec![0.01; n])).collect();
        let caps = symbols.iter().map(|s| (s.to_string(), vec![1.0; n])).collect();
        MarketData::new(
            Panel::from_columns(dates(n), returns).unwrap(),
            Panel::from_columns(dates(n), caps).unwrap(),
        )
        .unwrap()
        .with_industry_returns(Panel::from_columns(dates(n), industry_columns).unwrap())
        .unwrap()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_industry_buckets() {
        let data = market(vec![
            ("Banking".into(), vec![0.05, 0.05, 0.05, 0.05, 0.05]),
            ("Cement".into(), vec![0.01, f64::NAN, 0.01, 0.01, 0.01]),
            ("Steel".into(), vec![-0.04, -0.04, -0.04, -0.04, -0.04]),
            ("Sugar".into(), vec![f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN]),
        ]);
        let ranker = IndustryMomentumRanker::with_lookback(2, membership());
        let p = ranker.rank(&data, 3).unwrap();

        // Sugar has no data in the window and is left out; Banking wins, Steel loses.
        assert_eq!(p.winners, names(&["A", "B"]));
        assert_eq!(p.losers, names(&["D"]));
        // Z is not in the return panel; F belongs to no industry.
        assert_eq!(p.middles, names(&["C", "E", "F"]));
    }

    #[test]
    fn test_overlapping_constituent_is_winner() {
        let data = market(vec![
            ("Banking".into(), vec![0.05; 5]),
            ("Cement".into(), vec![0.00; 5]),
            ("Steel".into(), vec![0.01; 5]),
            ("Sugar".into(), vec![-0.05; 5]),
        ]);
        let ranker = IndustryMomentumRanker::with_lookback(2, membership());
        let p = ranker.rank(&data, 4).unwrap();

        // A belongs to both Banking (winner) and Sugar (loser).
        assert_eq!(p.winners, names(&["A", "B"]));
        assert_eq!(p.losers, names(&["E"]));
        assert!(!p.losers.contains(&"A".to_string()));
    }

    #[test]
    fn test_unknown_industry_fails() {
        let data = market(vec![("Shipping".into(), vec![0.01; 5])]);
        let ranker = IndustryMomentumRanker::with_lookback(2, membership());
        assert!(matches!(
            ranker.rank(&data, 3),
            Err(ShirazError::UnknownIndustry(name)) if name == "Shipping"
        ));
    }

    #[test]
    fn test_requires_industry_panel() {
        let n = 3;
        let data = MarketData::new(
            Panel::from_columns(dates(n), vec![("A".into(), vec![0.0; n])]).unwrap(),
            Panel::from_columns(dates(n), vec![("A".into(), vec![1.0; n])]).unwrap(),
        )
        .unwrap();
        let ranker = IndustryMomentumRanker::with_lookback(1, membership());
        assert!(matches!(
            ranker.rank(&data, 2),
            Err(ShirazError::StructuralMismatch(_))
        ));
    }
}
