//! Common types used throughout shiraz.
//!
//! This module defines the local-calendar date type and [`Panel`], the
//! date-indexed, instrument-keyed table every ranker and engine operates on.

use crate::{Result, ShirazError};
use ndarray::{Array2, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

/// An instrument (or industry) identifier.
pub type Symbol = String;

/// A date in the local solar calendar.
///
/// Ordering is lexicographic on `(year, month, day)`. Month 1 is the first
/// month of the local year; months 1-6 have 31 days, months 7-11 have 30 and
/// month 12 has 29 or 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalDate {
    year: i32,
    month: u32,
    day: u32,
}

impl LocalDate {
    /// Creates a date, validating the month and the day-of-month bound.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::InvalidData`] when the month is outside 1-12 or
    /// the day exceeds the month's length.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ShirazError::InvalidData(format!("month {month} out of range")));
        }
        let max_day = if month <= 6 { 31 } else { 30 };
        if day == 0 || day > max_day {
            return Err(ShirazError::InvalidData(format!(
                "day {day} out of range for month {month}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Returns the year.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12).
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Returns the day of month.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// The same month and day `years` years earlier.
    ///
    /// The result is only used as an ordering bound, so a day that does not
    /// exist in the earlier year (month 12, day 30) is kept as is.
    pub const fn years_earlier(&self, years: i32) -> Self {
        Self {
            year: self.year - years,
            month: self.month,
            day: self.day,
        }
    }

    /// The same month and day `years` years later; see [`LocalDate::years_earlier`].
    pub const fn years_later(&self, years: i32) -> Self {
        self.years_earlier(-years)
    }

    /// Whether `other` falls in the same calendar month (same year and month).
    pub const fn same_month(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month
    }
}

impl fmt::Display for LocalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for LocalDate {
    type Err = ShirazError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
        if parts.len() != 3 {
            return Err(ShirazError::InvalidData(format!("invalid date '{s}'")));
        }
        let parse = |p: &str| {
            p.parse::<i64>()
                .map_err(|e| ShirazError::InvalidData(format!("invalid date '{s}': {e}")))
        };
        let (year, month, day) = (parse(parts[0])?, parse(parts[1])?, parse(parts[2])?);
        Self::new(
            i32::try_from(year).map_err(|_| ShirazError::InvalidData(format!("invalid year in '{s}'")))?,
            u32::try_from(month).map_err(|_| ShirazError::InvalidData(format!("invalid month in '{s}'")))?,
            u32::try_from(day).map_err(|_| ShirazError::InvalidData(format!("invalid day in '{s}'")))?,
        )
    }
}

/// A date-indexed, symbol-keyed table of `f64` values.
///
/// Rows are dates (strictly increasing), columns are instruments or
/// industries. Missing observations are stored as `NaN` and are never
/// silently replaced.
///
/// # Example
///
/// ```
/// use shiraz_traits::{LocalDate, Panel};
///
/// let dates = vec![
///     LocalDate::new(1400, 1, 5).unwrap(),
///     LocalDate::new(1400, 2, 4).unwrap(),
/// ];
/// let panel = Panel::from_columns(
///     dates,
///     vec![("A".to_string(), vec![0.01, 0.02]), ("B".to_string(), vec![f64::NAN, 0.03])],
/// )
/// .unwrap();
///
/// assert_eq!(panel.n_rows(), 2);
/// assert!(panel.get(0, "B").unwrap().is_nan());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    dates: Vec<LocalDate>,
    columns: Vec<Symbol>,
    values: Array2<f64>,
}

impl Panel {
    /// Creates a panel from its parts.
    ///
    /// # Errors
    ///
    /// - [`ShirazError::StructuralMismatch`] if the value matrix shape does not
    ///   match `dates.len() x columns.len()`
    /// - [`ShirazError::InvalidData`] if dates are not strictly increasing or a
    ///   column name is repeated
    pub fn new(dates: Vec<LocalDate>, columns: Vec<Symbol>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != dates.len() || values.ncols() != columns.len() {
            return Err(ShirazError::StructuralMismatch(format!(
                "values are {}x{} but index has {} dates and {} columns",
                values.nrows(),
                values.ncols(),
                dates.len(),
                columns.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ShirazError::InvalidData(format!(
                "dates must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ShirazError::InvalidData(format!("duplicate column '{dup}'")));
        }
        Ok(Self {
            dates,
            columns,
            values,
        })
    }

    /// Creates a panel from `(name, values)` column pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] when a column's length
    /// differs from the number of dates, plus everything [`Panel::new`] checks.
    pub fn from_columns(dates: Vec<LocalDate>, columns: Vec<(Symbol, Vec<f64>)>) -> Result<Self> {
        let n_rows = dates.len();
        let mut values = Array2::from_elem((n_rows, columns.len()), f64::NAN);
        let mut names = Vec::with_capacity(columns.len());
        for (j, (name, column)) in columns.into_iter().enumerate() {
            if column.len() != n_rows {
                return Err(ShirazError::StructuralMismatch(format!(
                    "column '{name}' has {} values for {n_rows} dates",
                    column.len()
                )));
            }
            for (i, v) in column.into_iter().enumerate() {
                values[[i, j]] = v;
            }
            names.push(name);
        }
        Self::new(dates, names, values)
    }

    /// Returns the date index.
    pub fn dates(&self) -> &[LocalDate] {
        &self.dates
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[Symbol] {
        &self.columns
    }

    /// Returns the raw value matrix (rows = dates).
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of dates.
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// A column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_position(name)
            .map(|j| self.values.column(j))
    }

    /// Value at `(row, name)`; `None` when the row or column does not exist.
    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        let j = self.column_position(name)?;
        self.values.get([row, j]).copied()
    }

    /// Validates a (possibly negative) row position.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::IndexOutOfRange`] when `row` is not a valid row.
    pub fn check_row(&self, row: i64) -> Result<usize> {
        usize::try_from(row)
            .ok()
            .filter(|&r| r < self.n_rows())
            .ok_or_else(|| ShirazError::out_of_range(row, self.n_rows()))
    }

    /// Keeps the given rows, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::IndexOutOfRange`] for a row past the end and
    /// [`ShirazError::InvalidData`] if the selection breaks date ordering.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_rows()) {
            return Err(ShirazError::out_of_range(bad, self.n_rows()));
        }
        let dates = rows.iter().map(|&r| self.dates[r]).collect();
        Self::new(dates, self.columns.clone(), self.values.select(Axis(0), rows))
    }

    /// Keeps the named columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::MissingColumn`] for a name the panel lacks.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let positions = names
            .iter()
            .map(|n| {
                self.column_position(n.as_ref())
                    .ok_or_else(|| ShirazError::MissingColumn(n.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let columns = names.iter().map(|n| n.as_ref().to_string()).collect();
        Self::new(
            self.dates.clone(),
            columns,
            self.values.select(Axis(1), &positions),
        )
    }

    /// Keeps the rows dated within `[start, end]` (inclusive).
    pub fn slice_dates(&self, start: LocalDate, end: LocalDate) -> Self {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start && **d <= end)
            .map(|(i, _)| i)
            .collect();
        Self {
            dates: rows.iter().map(|&r| self.dates[r]).collect(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }

    /// Fails unless `other` has exactly the same date index.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] naming `what`.
    pub fn ensure_same_index(&self, other: &Self, what: &str) -> Result<()> {
        if self.dates != other.dates {
            return Err(ShirazError::StructuralMismatch(format!(
                "{what}: date index differs ({} vs {} rows)",
                self.n_rows(),
                other.n_rows()
            )));
        }
        Ok(())
    }

    /// Fails unless `other` has the same date index and the same columns.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::StructuralMismatch`] naming `what`.
    pub fn ensure_same_shape(&self, other: &Self, what: &str) -> Result<()> {
        self.ensure_same_index(other, what)?;
        if self.columns != other.columns {
            return Err(ShirazError::StructuralMismatch(format!(
                "{what}: columns differ ({} vs {} columns)",
                self.n_cols(),
                other.n_cols()
            )));
        }
        Ok(())
    }

    /// Converts the panel to a polars DataFrame with a leading `date` column.
    ///
    /// # Errors
    ///
    /// Propagates polars construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.n_cols() + 1);
        let dates: Vec<String> = self.dates.iter().map(ToString::to_string).collect();
        columns.push(Column::new("date".into(), dates));
        for (j, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self.values.column(j).to_vec();
            columns.push(Column::new(name.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}
