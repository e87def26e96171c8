//! Lagged winner/loser label panels.
//!
//! For an instrument at row `t` and each lag `j` in `2..=J+1`, all three
//! rankers are run at `t - j` and the instrument's bucket is recorded as a
//! 0/1 indicator in the column `<prefix><H|L><j>` (prefix `J`, `M` or `FH`).
//! Unset indicators are exactly 0.

use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shiraz_signals::RankerFactory;
use shiraz_traits::{
    Bucket, LocalDate, MarketData, Ranker, Result, ShirazError, SignalKind, Symbol,
};
use std::{collections::HashMap, ops::RangeInclusive};

/// Shape of a label panel: which lags are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    /// Lookback J; lags run from 2 to J+1 and every ranker uses J
    pub lags: usize,
}

impl LabelSpec {
    /// Create a spec for lookback `lags`.
    pub const fn new(lags: usize) -> Self {
        Self { lags }
    }

    /// The recorded lags `2..=J+1`.
    pub const fn offsets(&self) -> RangeInclusive<usize> {
        2..=self.lags + 1
    }

    /// Number of label columns.
    pub const fn width(&self) -> usize {
        6 * self.lags
    }

    /// First row whose every ranking index `t - j` has a full lookback window.
    pub const fn first_available(&self) -> usize {
        2 * self.lags + 1
    }

    /// Column names, grouped by signal then side then lag:
    /// `JH2..JH{J+1}, JL2.., MH.., ML.., FHH.., FHL..`.
    pub fn columns(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for kind in SignalKind::ALL {
            for side in ["H", "L"] {
                for j in self.offsets() {
                    names.push(format!("{}{side}{j}", kind.label_prefix()));
                }
            }
        }
        names
    }

    const fn column(&self, signal: usize, loser: bool, lag: usize) -> usize {
        (signal * 2 + loser as usize) * self.lags + (lag - 2)
    }
}

/// Computes label rows, caching the three partitions of every ranking index.
#[derive(Debug)]
pub struct LabelBuilder<'a> {
    data: &'a MarketData,
    spec: LabelSpec,
    rankers: Vec<Box<dyn Ranker>>,
    cache: HashMap<usize, Vec<HashMap<Symbol, Bucket>>>,
}

impl<'a> LabelBuilder<'a> {
    /// Builds one ranker per signal with lookback `spec.lags`.
    ///
    /// # Errors
    ///
    /// Fails if the factory cannot build the industry ranker.
    pub fn new(data: &'a MarketData, factory: &RankerFactory, spec: LabelSpec) -> Result<Self> {
        let rankers = SignalKind::ALL
            .into_iter()
            .map(|kind| factory.build(kind, spec.lags))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            data,
            spec,
            rankers,
            cache: HashMap::new(),
        })
    }

    /// The label spec.
    pub const fn spec(&self) -> &LabelSpec {
        &self.spec
    }

    /// Label row of `symbol` at row `t`, in [`LabelSpec::columns`] order.
    ///
    /// Returns `None` when `t` is before [`LabelSpec::first_available`] or
    /// past the end of the data; such rows are missing regressors.
    ///
    /// # Errors
    ///
    /// Propagates ranker errors.
    pub fn row(&mut self, symbol: &str, t: usize) -> Result<Option<Vec<f64>>> {
        if t < self.spec.first_available() || t >= self.data.n_periods() {
            return Ok(None);
        }
        let spec = self.spec;
        let mut row = vec![0.0; spec.width()];
        for lag in spec.offsets() {
            let partitions = self.partitions_at(t - lag)?;
            for (signal, index) in partitions.iter().enumerate() {
                match index.get(symbol) {
                    Some(Bucket::Winners) => row[spec.column(signal, false, lag)] = 1.0,
                    Some(Bucket::Losers) => row[spec.column(signal, true, lag)] = 1.0,
                    Some(Bucket::Middles) | None => {}
                }
            }
        }
        Ok(Some(row))
    }

    /// Label panel for every `(symbol, row)` pair with an available row.
    ///
    /// # Errors
    ///
    /// Propagates ranker errors.
    pub fn panel<S: AsRef<str>>(&mut self, symbols: &[S], rows: &[usize]) -> Result<LabelPanel> {
        let mut builder = LabelPanelBuilder::new(self.spec.columns());
        for symbol in symbols {
            for &t in rows {
                if let Some(labels) = self.row(symbol.as_ref(), t)? {
                    builder.push(symbol.as_ref(), self.data.dates()[t], labels)?;
                }
            }
        }
        builder.finish()
    }

    fn partitions_at(&mut self, index: usize) -> Result<&[HashMap<Symbol, Bucket>]> {
        if !self.cache.contains_key(&index) {
            let partitions = self
                .rankers
                .iter()
                .map(|r| r.rank(self.data, index).map(|p| p.index()))
                .collect::<Result<Vec<_>>>()?;
            self.cache.insert(index, partitions);
        }
        self.cache
            .get(&index)
            .map(Vec::as_slice)
            .ok_or_else(|| ShirazError::Other(format!("label cache miss at {index}")))
    }
}

/// Append-only builder for a [`LabelPanel`].
#[derive(Debug, Clone)]
pub struct LabelPanelBuilder {
    columns: Vec<String>,
    keys: Vec<(Symbol, LocalDate)>,
    values: Vec<f64>,
}

impl LabelPanelBuilder {
    /// Create an empty builder with the given label columns.
    pub const fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] if the row width differs
    /// from the column count.
    pub fn push(&mut self, symbol: &str, date: LocalDate, row: Vec<f64>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ShirazError::StructuralMismatch(format!(
                "label row has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.keys.push((symbol.to_string(), date));
        self.values.extend(row);
        Ok(())
    }

    /// Number of rows appended so far.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no row has been appended.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Materializes the panel.
    ///
    /// # Errors
    ///
    /// Only fails if the accumulated values do not form a matrix, which
    /// [`LabelPanelBuilder::push`] prevents.
    pub fn finish(self) -> Result<LabelPanel> {
        let values = Array2::from_shape_vec((self.keys.len(), self.columns.len()), self.values)
            .map_err(|e| ShirazError::StructuralMismatch(e.to_string()))?;
        Ok(LabelPanel {
            columns: self.columns,
            keys: self.keys,
            values,
        })
    }
}

/// Per `(instrument, date)` rows of 0/1 winner/loser indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPanel {
    columns: Vec<String>,
    keys: Vec<(Symbol, LocalDate)>,
    values: Array2<f64>,
}

impl LabelPanel {
    /// Label column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row keys.
    pub fn keys(&self) -> &[(Symbol, LocalDate)] {
        &self.keys
    }

    /// Indicator matrix.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// DataFrame with `symbol`, `date` and one column per label.
    ///
    /// # Errors
    ///
    /// Propagates polars construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Column::new(
                "symbol".into(),
                self.keys.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "date".into(),
                self.keys.iter().map(|(_, d)| d.to_string()).collect::<Vec<_>>(),
            ),
        ];
        for (j, name) in self.columns.iter().enumerate() {
            columns.push(Column::new(name.as_str().into(), self.values.column(j).to_vec()));
        }
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_columns() {
        let spec = LabelSpec::new(2);
        assert_eq!(
            spec.columns(),
            vec![
                "JH2", "JH3", "JL2", "JL3", "MH2", "MH3", "ML2", "ML3", "FHH2", "FHH3", "FHL2",
                "FHL3"
            ]
        );
        assert_eq!(spec.width(), 12);
        assert_eq!(spec.first_available(), 5);
    }

    #[test]
    fn test_column_positions_match_names() {
        let spec = LabelSpec::new(3);
        let names = spec.columns();
        assert_eq!(names[spec.column(0, false, 2)], "JH2");
        assert_eq!(names[spec.column(1, true, 4)], "ML4");
        assert_eq!(names[spec.column(2, true, 3)], "FHL3");
    }

    #[test]
    fn test_panel_builder_rejects_wrong_width() {
        let mut builder = LabelPanelBuilder::new(vec!["JH2".into(), "JL2".into()]);
        let date = LocalDate::new(1400, 1, 1).unwrap();
        assert!(builder.push("A", date, vec![1.0]).is_err());
        builder.push("A", date, vec![1.0, 0.0]).unwrap();
        let panel = builder.finish().unwrap();
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.to_dataframe().unwrap().width(), 4);
    }
}
