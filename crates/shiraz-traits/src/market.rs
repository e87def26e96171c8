//! The market data bundle consumed by rankers and engines.

use crate::{
    LocalDate, Panel, Result, ShirazError, Symbol,
    calendar::is_seasonal,
    ranker::{LOSER_QUANTILE, WINNER_QUANTILE},
    stats::quantile,
};

/// Price-to-trailing-high ratios with their per-date tail thresholds.
///
/// The 70th and 30th percentile of every row are computed once, over the
/// full row, when the panel is built. Rankers compare against these series
/// instead of recomputing quantiles on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityPanel {
    ratios: Panel,
    upper: Vec<f64>,
    lower: Vec<f64>,
}

impl ProximityPanel {
    /// Wraps a ratio panel and precomputes its percentile series.
    pub fn new(ratios: Panel) -> Self {
        let (upper, lower) = ratios
            .values()
            .rows()
            .into_iter()
            .map(|row| {
                (
                    quantile(row.iter().copied(), WINNER_QUANTILE),
                    quantile(row.iter().copied(), LOSER_QUANTILE),
                )
            })
            .unzip();
        Self {
            ratios,
            upper,
            lower,
        }
    }

    /// The ratio panel.
    pub const fn ratios(&self) -> &Panel {
        &self.ratios
    }

    /// Per-date 70th percentile series.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Per-date 30th percentile series.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// `(upper, lower)` thresholds at `row`.
    pub fn thresholds(&self, row: usize) -> Option<(f64, f64)> {
        Some((*self.upper.get(row)?, *self.lower.get(row)?))
    }

    fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        Ok(Self::new(self.ratios.select_columns(names)?))
    }

    fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        Ok(Self::new(self.ratios.select_rows(rows)?))
    }
}

/// Returns, market caps and the auxiliary panels the rankers need.
///
/// The return and market-cap panels must share dates and columns; the
/// optional industry-return and proximity panels must share the dates.
/// Nothing is ever reindexed: a mismatch is a
/// [`ShirazError::StructuralMismatch`].
#[derive(Debug, Clone)]
pub struct MarketData {
    returns: Panel,
    market_caps: Panel,
    industry_returns: Option<Panel>,
    proximity: Option<ProximityPanel>,
}

impl MarketData {
    /// Creates market data from aligned return and market-cap panels.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] if the panels differ in
    /// dates or columns.
    pub fn new(returns: Panel, market_caps: Panel) -> Result<Self> {
        returns.ensure_same_shape(&market_caps, "market caps vs returns")?;
        Ok(Self {
            returns,
            market_caps,
            industry_returns: None,
            proximity: None,
        })
    }

    /// Attaches an industry return panel (columns are industry names).
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] if its dates differ.
    pub fn with_industry_returns(mut self, industry_returns: Panel) -> Result<Self> {
        self.returns
            .ensure_same_index(&industry_returns, "industry returns vs returns")?;
        self.industry_returns = Some(industry_returns);
        Ok(self)
    }

    /// Attaches a price-to-trailing-high ratio panel.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] unless the ratios share the
    /// return panel's dates and columns.
    pub fn with_proximity(mut self, ratios: Panel) -> Result<Self> {
        self.returns
            .ensure_same_shape(&ratios, "proximity ratios vs returns")?;
        self.proximity = Some(ProximityPanel::new(ratios));
        Ok(self)
    }

    /// The return panel.
    pub const fn returns(&self) -> &Panel {
        &self.returns
    }

    /// The market-cap panel.
    pub const fn market_caps(&self) -> &Panel {
        &self.market_caps
    }

    /// The industry return panel, if attached.
    pub const fn industry_returns(&self) -> Option<&Panel> {
        self.industry_returns.as_ref()
    }

    /// The proximity panel, if attached.
    pub const fn proximity(&self) -> Option<&ProximityPanel> {
        self.proximity.as_ref()
    }

    /// The industry return panel, or an error naming the caller's need.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] when none is attached.
    pub fn require_industry_returns(&self) -> Result<&Panel> {
        self.industry_returns().ok_or_else(|| {
            ShirazError::StructuralMismatch("no industry return panel attached".to_string())
        })
    }

    /// The proximity panel, or an error.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] when none is attached.
    pub fn require_proximity(&self) -> Result<&ProximityPanel> {
        self.proximity().ok_or_else(|| {
            ShirazError::StructuralMismatch("no proximity ratio panel attached".to_string())
        })
    }

    /// The shared date index.
    pub fn dates(&self) -> &[LocalDate] {
        self.returns.dates()
    }

    /// Number of periods.
    pub fn n_periods(&self) -> usize {
        self.returns.n_rows()
    }

    /// The instrument universe, in column order.
    pub fn symbols(&self) -> &[Symbol] {
        self.returns.columns()
    }

    /// Restricts the instrument universe to `symbols`.
    ///
    /// Instrument-keyed panels are sliced (and proximity thresholds
    /// recomputed for the subset); the industry return panel is kept whole.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::MissingColumn`] for a symbol outside the universe.
    pub fn restrict<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Self> {
        Ok(Self {
            returns: self.returns.select_columns(symbols)?,
            market_caps: self.market_caps.select_columns(symbols)?,
            industry_returns: self.industry_returns.clone(),
            proximity: self
                .proximity
                .as_ref()
                .map(|p| p.select_columns(symbols))
                .transpose()?,
        })
    }

    /// Drops every row dated in the seasonal month, from every panel.
    ///
    /// # Errors
    ///
    /// Propagates row-selection errors.
    pub fn without_seasonal_month(&self) -> Result<Self> {
        let rows: Vec<usize> = self
            .dates()
            .iter()
            .enumerate()
            .filter(|(_, d)| !is_seasonal(d))
            .map(|(i, _)| i)
            .collect();
        self.select_rows(&rows)
    }

    fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        Ok(Self {
            returns: self.returns.select_rows(rows)?,
            market_caps: self.market_caps.select_rows(rows)?,
            industry_returns: self
                .industry_returns
                .as_ref()
                .map(|p| p.select_rows(rows))
                .transpose()?,
            proximity: self
                .proximity
                .as_ref()
                .map(|p| p.select_rows(rows))
                .transpose()?,
        })
    }
}
