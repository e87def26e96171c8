//! Ordinary least squares.
//!
//! Solves the normal equations with a pivoted Gauss-Jordan elimination on
//! column-equilibrated `X'X`. Columns that are zero or collinear with the
//! ones before them receive a zero coefficient and are listed in
//! [`OlsFit::rank_deficient`], so a degenerate fit is visible to callers.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use shiraz_traits::{Result, ShirazError};

/// Relative pivot tolerance on the equilibrated normal matrix.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Result of an OLS fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    /// One coefficient per regressor column
    pub coefficients: Vec<f64>,
    /// Columns dropped as zero or collinear (coefficient fixed at 0)
    pub rank_deficient: Vec<usize>,
    /// Number of complete observations used
    pub n_obs: usize,
}

impl OlsFit {
    /// Whether every column was identified.
    pub fn is_full_rank(&self) -> bool {
        self.rank_deficient.is_empty()
    }
}

/// Fits `y = X b` by least squares, dropping rows with any missing value.
///
/// # Errors
///
/// - [`ShirazError::StructuralMismatch`] if `y` and `x` differ in length
/// - [`ShirazError::Regression`] if no complete row remains
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use shiraz_eval::regression::ols;
///
/// let x = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
/// let y = array![3.0, 5.0, 7.0];
/// let fit = ols(y.view(), x.view()).unwrap();
/// assert!((fit.coefficients[0] - 1.0).abs() < 1e-9);
/// assert!((fit.coefficients[1] - 2.0).abs() < 1e-9);
/// ```
pub fn ols(y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>) -> Result<OlsFit> {
    if y.len() != x.nrows() {
        return Err(ShirazError::StructuralMismatch(format!(
            "regression has {} responses for {} rows",
            y.len(),
            x.nrows()
        )));
    }

    let complete: Vec<usize> = (0..y.len())
        .filter(|&i| y[i].is_finite() && x.row(i).iter().all(|v| v.is_finite()))
        .collect();
    if complete.is_empty() {
        return Err(ShirazError::Regression("no complete observations".to_string()));
    }
    let x = x.select(Axis(0), &complete);
    let y = y.select(Axis(0), &complete);

    let xtx = x.t().dot(&x);
    let xty = x.t().dot(&y);
    let (coefficients, rank_deficient) = solve_normal_equations(xtx, xty);

    Ok(OlsFit {
        coefficients: coefficients.to_vec(),
        rank_deficient,
        n_obs: complete.len(),
    })
}

/// Solves `A b = c` for symmetric positive semi-definite `A`.
fn solve_normal_equations(mut a: Array2<f64>, mut c: Array1<f64>) -> (Array1<f64>, Vec<usize>) {
    let p = a.nrows();
    let scale: Vec<f64> = (0..p).map(|j| a[[j, j]].sqrt()).collect();

    let mut rank_deficient = Vec::new();
    for i in 0..p {
        for j in 0..p {
            a[[i, j]] = if scale[i] > 0.0 && scale[j] > 0.0 {
                a[[i, j]] / (scale[i] * scale[j])
            } else {
                0.0
            };
        }
        c[i] = if scale[i] > 0.0 { c[i] / scale[i] } else { 0.0 };
    }

    let mut pivots = Vec::with_capacity(p);
    let mut row = 0;
    for col in 0..p {
        let best = (row..p).max_by(|&r1, &r2| a[[r1, col]].abs().total_cmp(&a[[r2, col]].abs()));
        let Some(best) = best.filter(|&r| a[[r, col]].abs() > PIVOT_TOLERANCE) else {
            rank_deficient.push(col);
            continue;
        };

        if best != row {
            for k in 0..p {
                a.swap([row, k], [best, k]);
            }
            c.swap(row, best);
        }

        let pivot = a[[row, col]];
        for k in 0..p {
            a[[row, k]] /= pivot;
        }
        c[row] /= pivot;

        for r in 0..p {
            let factor = a[[r, col]];
            if r != row && factor != 0.0 {
                for k in 0..p {
                    a[[r, k]] -= factor * a[[row, k]];
                }
                c[r] -= factor * c[row];
            }
        }

        pivots.push((row, col));
        row += 1;
    }

    let mut b = Array1::zeros(p);
    for (row, col) in pivots {
        b[col] = c[row] / scale[col];
    }
    (b, rank_deficient)
}
