//! Ordinary least squares.
//!
//! Every estimator in this crate (ADF regressions, VAR equations, VECM
//! auxiliary regressions, AR(1) half-life) reduces to
//!
//! ```text
//! minimize ‖Y - X B‖²
//! ```
//!
//! with `Y` either a vector or a matrix of stacked equations sharing the same
//! regressors.
//!
//! Implementation choices:
//! - SVD solve, so tall design matrices are handled without forming `XᵀX`
//!   (nalgebra's `QR::solve` is only for square systems).
//! - Progressively looser tolerances before giving up on a near-singular design.
//! - Standard errors need `(XᵀX)⁻¹` explicitly; that is the only place we invert.

use nalgebra::{DMatrix, DVector};

/// Solve `X B = Y` in the least-squares sense for a matrix right-hand side.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if x.nrows() != y.nrows() || x.nrows() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Vector right-hand side convenience wrapper.
pub fn solve_least_squares_vec(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let y_mat = DMatrix::from_column_slice(y.len(), 1, y.as_slice());
    solve_least_squares(x, &y_mat).map(|b| b.column(0).into_owned())
}

/// Residuals of regressing every column of `y` on `x`.
pub fn regression_residuals(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let beta = solve_least_squares(x, y)?;
    Some(y - x * beta)
}

/// Single-equation OLS output.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coef: DVector<f64>,
    pub std_err: DVector<f64>,
    pub residuals: DVector<f64>,
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.coef[i] / self.std_err[i]
    }

    /// Gaussian log-likelihood at the ML variance estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion counting every regressor column.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coef.len() as f64
    }
}

/// Fit `y = X β + ε` and compute classical standard errors.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let n = x.nrows();
    let k = x.ncols();
    if n <= k {
        return None;
    }

    let coef = solve_least_squares_vec(x, y)?;
    let residuals = y - x * &coef;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (n - k) as f64;

    let xtx_inv = (x.transpose() * x).try_inverse()?;
    let std_err = DVector::from_iterator(k, (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()));
    if !std_err.iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(OlsFit {
        coef,
        std_err,
        residuals,
        ssr,
        nobs: n,
    })
}

/// Simple linear regression `y = a + b x` with the correlation coefficient.
#[derive(Debug, Clone, Copy)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
}

pub fn linregress(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    let nf = n as f64;
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sxx += (xi - mx) * (xi - mx);
        syy += (yi - my) * (yi - my);
        sxy += (xi - mx) * (yi - my);
    }
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let r_value = if syy > 0.0 { sxy / (sxx * syy).sqrt() } else { 0.0 };
    Some(LineFit {
        slope,
        intercept: my - slope * mx,
        r_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares_vec(&x, &y).unwrap();
        assert_abs_diff_eq!(beta[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(beta[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn matrix_rhs_solves_each_equation() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        // col0 = 1 + x, col1 = -2x
        let y = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 2.0, -2.0, 3.0, -4.0, 4.0, -6.0]);
        let b = solve_least_squares(&x, &y).unwrap();
        assert_abs_diff_eq!(b[(0, 0)], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(b[(1, 0)], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(b[(0, 1)], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(b[(1, 1)], -2.0, epsilon = 1e-10);
    }

    #[test]
    fn ols_standard_errors_are_finite_with_noise() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [1.1, 2.9, 5.2, 6.8, 9.1, 11.0];
        let x = DMatrix::from_fn(6, 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
        let y = DVector::from_row_slice(&ys);
        let fit = ols(&x, &y).unwrap();
        assert!(fit.std_err.iter().all(|s| s.is_finite() && *s > 0.0));
        assert!(fit.t_value(1) > 10.0);
    }

    #[test]
    fn linregress_perfect_line() {
        let fit = linregress(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert_abs_diff_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.r_value, 1.0, epsilon = 1e-12);
    }
}
