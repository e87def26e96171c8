//! Calendar and panel utilities.
//!
//! Month-boundary downsampling, compounding of daily returns into monthly
//! returns, and the split around the seasonal month (local month 1, whose
//! returns behave anomalously and are isolated or excluded by every engine).

use crate::{LocalDate, Panel, Result};
use ndarray::Array2;

/// The local calendar month treated separately by every strategy.
pub const SEASONAL_MONTH: u32 = 1;

/// Whether `date` falls in [`SEASONAL_MONTH`].
pub const fn is_seasonal(date: &LocalDate) -> bool {
    date.month() == SEASONAL_MONTH
}

/// Rows at month-boundary transitions.
///
/// Keeps the first row, every row whose calendar month (year and month)
/// differs from the previous row's, and the last row. A one-row panel yields
/// that row once; an empty panel yields an empty panel.
///
/// # Errors
///
/// Only fails if the underlying row selection does, which cannot happen for
/// a valid panel.
pub fn monthly_sample(panel: &Panel) -> Result<Panel> {
    let dates = panel.dates();
    let mut rows = Vec::new();
    for (i, date) in dates.iter().enumerate() {
        if i == 0 || !date.same_month(&dates[i - 1]) {
            rows.push(i);
        }
    }
    if let Some(last) = dates.len().checked_sub(1)
        && rows.last() != Some(&last)
    {
        rows.push(last);
    }
    panel.select_rows(&rows)
}

/// Compounds a daily return panel into monthly returns.
///
/// For each maximal run of consecutive rows sharing a calendar month, the
/// value is `prod(1 + r) - 1` over the run's non-missing returns, indexed by
/// the run's first date. A result of exactly zero (which is what an
/// all-missing run produces) is reported as `NaN`.
///
/// # Errors
///
/// Propagates panel construction errors.
pub fn compound_to_monthly(panel: &Panel) -> Result<Panel> {
    let runs = month_runs(panel.dates());
    let values = panel.values();
    let mut out = Array2::from_elem((runs.len(), panel.n_cols()), f64::NAN);

    for (k, &(start, end)) in runs.iter().enumerate() {
        for j in 0..panel.n_cols() {
            let growth: f64 = (start..end)
                .map(|i| values[[i, j]])
                .filter(|r| !r.is_nan())
                .map(|r| 1.0 + r)
                .product();
            let compounded = growth - 1.0;
            out[[k, j]] = if compounded == 0.0 { f64::NAN } else { compounded };
        }
    }

    let dates = runs.iter().map(|&(start, _)| panel.dates()[start]).collect();
    Panel::new(dates, panel.columns().to_vec(), out)
}

/// Splits a panel into `(seasonal rows, all other rows)`.
///
/// Every row lands in exactly one side, in its original order.
///
/// # Errors
///
/// Propagates row-selection errors.
pub fn seasonal_split(panel: &Panel) -> Result<(Panel, Panel)> {
    let (seasonal, rest): (Vec<usize>, Vec<usize>) =
        (0..panel.n_rows()).partition(|&i| is_seasonal(&panel.dates()[i]));
    Ok((panel.select_rows(&seasonal)?, panel.select_rows(&rest)?))
}

/// Half-open `[start, end)` row ranges of consecutive same-month dates.
fn month_runs(dates: &[LocalDate]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=dates.len() {
        if i == dates.len() || !dates[i].same_month(&dates[start]) {
            if i > start {
                runs.push((start, i));
            }
            start = i;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> LocalDate {
        LocalDate::new(y, m, day).unwrap()
    }

    fn single(dates: Vec<LocalDate>, values: Vec<f64>) -> Panel {
        Panel::from_columns(dates, vec![("A".into(), values)]).unwrap()
    }

    #[test]
    fn test_monthly_sample_boundaries() {
        let dates = vec![
            d(1400, 1, 3),
            d(1400, 1, 10),
            d(1400, 2, 2),
            d(1400, 2, 20),
            d(1400, 3, 1),
            d(1400, 3, 15),
        ];
        let panel = single(dates, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let sampled = monthly_sample(&panel).unwrap();

        assert_eq!(
            sampled.dates(),
            &[d(1400, 1, 3), d(1400, 2, 2), d(1400, 3, 1), d(1400, 3, 15)]
        );
    }

    #[test]
    fn test_monthly_sample_last_row_already_boundary() {
        let panel = single(vec![d(1400, 1, 3), d(1400, 2, 2)], vec![1.0, 2.0]);
        let sampled = monthly_sample(&panel).unwrap();
        assert_eq!(sampled.dates(), &[d(1400, 1, 3), d(1400, 2, 2)]);
    }

    #[test]
    fn test_monthly_sample_single_row() {
        let panel = single(vec![d(1400, 5, 1)], vec![1.0]);
        let sampled = monthly_sample(&panel).unwrap();
        assert_eq!(sampled.n_rows(), 1);
    }

    #[test]
    fn test_monthly_sample_distinguishes_years() {
        let panel = single(vec![d(1399, 4, 1), d(1400, 4, 1), d(1400, 4, 2)], vec![1.0; 3]);
        let sampled = monthly_sample(&panel).unwrap();
        assert_eq!(sampled.dates(), &[d(1399, 4, 1), d(1400, 4, 1), d(1400, 4, 2)]);
    }

    #[rstest]
    #[case(0.01, 20)]
    #[case(-0.02, 5)]
    #[case(0.5, 1)]
    fn test_compound_constant_returns(#[case] r: f64, #[case] n: u32) {
        let dates: Vec<LocalDate> = (1..=n).map(|day| d(1400, 2, day)).collect();
        let panel = single(dates, vec![r; n as usize]);
        let monthly = compound_to_monthly(&panel).unwrap();

        assert_eq!(monthly.n_rows(), 1);
        assert_eq!(monthly.dates()[0], d(1400, 2, 1));
        assert_relative_eq!(
            monthly.values()[[0, 0]],
            (1.0 + r).powi(n as i32) - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_compound_all_missing_month_is_missing() {
        let dates = vec![d(1400, 1, 1), d(1400, 1, 2), d(1400, 2, 1), d(1400, 2, 2)];
        let panel = single(dates, vec![f64::NAN, f64::NAN, 0.01, f64::NAN]);
        let monthly = compound_to_monthly(&panel).unwrap();

        assert_eq!(monthly.dates(), &[d(1400, 1, 1), d(1400, 2, 1)]);
        assert!(monthly.values()[[0, 0]].is_nan());
        assert_relative_eq!(monthly.values()[[1, 0]], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_seasonal_split_covers_every_row() {
        let dates: Vec<LocalDate> = (1..=12)
            .flat_map(|m| [d(1400, m, 1), d(1400, m, 10)])
            .collect();
        let n = dates.len();
        let panel = single(dates, (0..n).map(|i| i as f64).collect());

        let (seasonal, rest) = seasonal_split(&panel).unwrap();
        assert_eq!(seasonal.n_rows(), 2);
        assert!(seasonal.dates().iter().all(|d| d.month() == 1));
        assert_eq!(rest.n_rows(), n - 2);
        assert!(rest.dates().iter().all(|d| d.month() != 1));
        assert!(seasonal.dates().iter().all(|d| !rest.dates().contains(d)));
    }
}
