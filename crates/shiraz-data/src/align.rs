//! Date alignment between panels.

use ndarray::Array2;
use shiraz_traits::{LocalDate, Panel};
use std::collections::HashMap;

/// Aligns `panel` onto `dates` by calendar month, keeping its columns.
///
/// Row `i` of the result is the panel's last row dated in the same year and
/// month as `dates[i]`, or `NaN` when the panel has no row in that month.
///
/// # Errors
///
/// Fails if `dates` is not strictly increasing.
pub fn align_months(panel: &Panel, dates: &[LocalDate]) -> crate::Result<Panel> {
    let rows: HashMap<(i32, u32), usize> = panel
        .dates()
        .iter()
        .enumerate()
        .map(|(i, d)| ((d.year(), d.month()), i))
        .collect();

    let mut values = Array2::from_elem((dates.len(), panel.n_cols()), f64::NAN);
    for (i, date) in dates.iter().enumerate() {
        if let Some(&src) = rows.get(&(date.year(), date.month())) {
            values.row_mut(i).assign(&panel.values().row(src));
        }
    }
    Ok(Panel::new(dates.to_vec(), panel.columns().to_vec(), values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> LocalDate {
        LocalDate::new(1400, m, d).unwrap()
    }

    #[test]
    fn test_align_fills_missing_months() {
        let panel = Panel::from_columns(
            vec![date(2, 3), date(3, 1), date(3, 20), date(5, 2)],
            vec![("A".to_string(), vec![0.2, 0.3, 0.35, 0.5])],
        )
        .unwrap();
        let aligned =
            align_months(&panel, &[date(1, 1), date(2, 1), date(3, 1), date(4, 1)]).unwrap();

        assert_eq!(aligned.n_rows(), 4);
        assert!(aligned.get(0, "A").unwrap().is_nan());
        assert_eq!(aligned.get(1, "A"), Some(0.2));
        assert_eq!(aligned.get(2, "A"), Some(0.35));
        assert!(aligned.get(3, "A").unwrap().is_nan());
    }

    #[test]
    fn test_align_rejects_unsorted_dates() {
        let panel =
            Panel::from_columns(vec![date(1, 1)], vec![("A".to_string(), vec![1.0])]).unwrap();
        assert!(align_months(&panel, &[date(2, 1), date(1, 1)]).is_err());
    }
}
