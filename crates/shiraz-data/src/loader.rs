//! CSV panel loading.

use crate::{DataError, Result, calendar::gregorian_to_local};
use chrono::NaiveDate;
use ndarray::Array2;
use polars::prelude::*;
use shiraz_traits::{LocalDate, Panel};
use std::path::Path;

/// Calendar of the date column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// Local solar dates, `YYYY-MM-DD` or `YYYY/MM/DD`.
    #[default]
    Local,
    /// Gregorian dates (`YYYY-MM-DD`, `YYYY/MM/DD` or `YYYYMMDD`), converted on load.
    Gregorian,
}

impl DateFormat {
    fn parse(self, raw: &str) -> Result<LocalDate> {
        let raw = raw.trim();
        match self {
            Self::Local => raw
                .parse()
                .map_err(|e| DataError::InvalidDate(format!("'{raw}': {e}"))),
            Self::Gregorian => {
                let date = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"]
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                    .ok_or_else(|| DataError::InvalidDate(format!("'{raw}' is not a Gregorian date")))?;
                gregorian_to_local(date)
            }
        }
    }
}

/// Loads a panel from a CSV file with a header row.
///
/// The first column holds the dates; every other column becomes a panel
/// column. Empty or non-numeric cells become `NaN`. Rows are sorted by date.
///
/// # Errors
///
/// - [`DataError::Polars`] if the file cannot be read as CSV
/// - [`DataError::InvalidDate`] for an unparseable date
/// - [`DataError::Core`] for duplicate dates or column names
pub fn load_panel(path: impl AsRef<Path>, format: DateFormat) -> Result<Panel> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    tracing::debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read csv");
    panel_from_dataframe(&df, format)
}

/// Converts a DataFrame whose first column holds dates into a [`Panel`].
///
/// # Errors
///
/// As [`load_panel`], plus [`DataError::NoData`] for a frame without value
/// columns.
pub fn panel_from_dataframe(df: &DataFrame, format: DateFormat) -> Result<Panel> {
    let columns = df.get_columns();
    let Some((date_column, value_columns)) = columns.split_first() else {
        return Err(DataError::NoData("empty frame".to_string()));
    };
    if value_columns.is_empty() {
        return Err(DataError::NoData(format!(
            "frame has only the date column '{}'",
            date_column.name()
        )));
    }

    let raw_dates = date_column.as_materialized_series().cast(&DataType::String)?;
    let dates = raw_dates
        .str()?
        .into_iter()
        .map(|cell| {
            let cell = cell.ok_or_else(|| DataError::InvalidDate("missing date".to_string()))?;
            format.parse(cell)
        })
        .collect::<Result<Vec<LocalDate>>>()?;

    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&i| dates[i]);

    let mut values = Array2::from_elem((dates.len(), value_columns.len()), f64::NAN);
    for (j, column) in value_columns.iter().enumerate() {
        // Non-strict: unparseable cells become null.
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        let cells: Vec<f64> = series
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        for (row, &i) in order.iter().enumerate() {
            values[[row, j]] = cells[i];
        }
    }

    let names = value_columns.iter().map(|c| c.name().to_string()).collect();
    let sorted_dates = order.iter().map(|&i| dates[i]).collect();
    Ok(Panel::new(sorted_dates, names, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_local_frame() {
        let df = df! {
            "date" => ["1400/02/01", "1400-01-01"],
            "A" => [Some(0.02), None],
            "B" => [0.5, 0.25],
        }
        .unwrap();
        let panel = panel_from_dataframe(&df, DateFormat::Local).unwrap();

        assert_eq!(panel.columns(), ["A", "B"]);
        assert_eq!(panel.dates()[0].to_string(), "1400-01-01");
        assert!(panel.get(0, "A").unwrap().is_nan());
        assert_relative_eq!(panel.get(1, "A").unwrap(), 0.02);
        assert_relative_eq!(panel.get(0, "B").unwrap(), 0.25);
    }

    #[test]
    fn test_gregorian_frame() {
        let df = df! {
            "date" => ["2021-03-21", "2021-04-21"],
            "A" => [1.0, 2.0],
        }
        .unwrap();
        let panel = panel_from_dataframe(&df, DateFormat::Gregorian).unwrap();
        let dates: Vec<String> = panel.dates().iter().map(ToString::to_string).collect();
        assert_eq!(dates, ["1400-01-01", "1400-02-01"]);
    }

    #[test]
    fn test_rejects_bad_dates_and_duplicates() {
        let bad = df! { "date" => ["not a date"], "A" => [1.0] }.unwrap();
        assert!(matches!(
            panel_from_dataframe(&bad, DateFormat::Gregorian),
            Err(DataError::InvalidDate(_))
        ));

        let duplicated = df! { "date" => ["1400-01-01", "1400-01-01"], "A" => [1.0, 2.0] }.unwrap();
        assert!(matches!(
            panel_from_dataframe(&duplicated, DateFormat::Local),
            Err(DataError::Core(_))
        ));
    }

    #[test]
    fn test_requires_value_columns() {
        let df = df! { "date" => ["1400-01-01"] }.unwrap();
        assert!(matches!(
            panel_from_dataframe(&df, DateFormat::Local),
            Err(DataError::NoData(_))
        ));
    }

    #[test]
    fn test_load_panel_from_file() {
        let path = std::env::temp_dir().join(format!("shiraz-loader-{}.csv", std::process::id()));
        std::fs::write(&path, "date,A,B\n1400-01-01,0.01,\n1400-02-01,0.03,0.04\n").unwrap();
        let panel = load_panel(&path, DateFormat::Local).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(panel.n_rows(), 2);
        assert!(panel.get(0, "B").unwrap().is_nan());
        assert_relative_eq!(panel.get(1, "B").unwrap(), 0.04);
    }
}
