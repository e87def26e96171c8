//! Statistical utility functions shared by the rankers and engines.
//!
//! Missing observations are `NaN`; every helper here skips them rather than
//! imputing a value.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Degrees-of-freedom correction used by [`std_dev`] and [`t_statistic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ddof {
    /// Population standard deviation (N denominator).
    Population,
    /// Sample standard deviation (N-1 denominator).
    Sample,
}

impl Ddof {
    const fn correction(self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }
}

/// Linear-interpolation quantile over the non-missing values.
///
/// The values are sorted and the quantile at `q` is interpolated between the
/// order statistics at `floor((n-1)q)` and `ceil((n-1)q)`. An empty (or
/// all-missing) input yields `NaN`, and since every comparison against `NaN`
/// is false, a threshold of `NaN` selects nothing.
///
/// # Examples
///
/// ```
/// use shiraz_traits::stats::quantile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// assert!((quantile(values, 0.7) - 4.5).abs() < 1e-12);
/// assert!((quantile(values, 0.3) - 2.5).abs() < 1e-12);
/// assert!(quantile([f64::NAN], 0.5).is_nan());
/// ```
pub fn quantile(values: impl IntoIterator<Item = f64>, q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().filter(|x| !x.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let frac = position - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    // Same lerp as numpy so ties at a boundary land on the exact order statistic.
    if frac >= 0.5 { b - (b - a) * (1.0 - frac) } else { a + (b - a) * frac }
}

/// Arithmetic mean of the non-missing values, `NaN` when there are none.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|x| !x.is_nan())
        .fold((0.0, 0_usize), |(s, c), x| (s + x, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Mean of a complete window: `None` if any value is missing or the window is empty.
pub fn complete_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0_usize;
    for v in values {
        if v.is_nan() {
            return None;
        }
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Standard deviation of the finite values.
///
/// Returns `NaN` when fewer than `ddof + 1` finite values are present.
pub fn std_dev(values: &[f64], ddof: Ddof) -> f64 {
    let finite: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    let n = finite.len();
    if n <= ddof.correction() {
        return f64::NAN;
    }
    let mean = finite.iter().sum::<f64>() / n as f64;
    let variance =
        finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - ddof.correction()) as f64;
    variance.sqrt()
}

/// Simple t-statistic `mean * sqrt(n) / std` over the finite values.
///
/// A standard deviation below [`MIN_STD_THRESHOLD`] (including the
/// zero-variance case) yields `NaN`.
///
/// # Examples
///
/// ```
/// use shiraz_traits::stats::{t_statistic, Ddof};
///
/// assert!(t_statistic(&[0.08, 0.08, 0.08], Ddof::Population).is_nan());
/// assert!(t_statistic(&[0.01, 0.03, 0.02], Ddof::Sample) > 0.0);
/// ```
pub fn t_statistic(values: &[f64], ddof: Ddof) -> f64 {
    let finite: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    let std = std_dev(&finite, ddof);
    if std.is_nan() || std < MIN_STD_THRESHOLD {
        return f64::NAN;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    mean * n.sqrt() / std
}
