//! Augmented Dickey–Fuller unit-root test.
//!
//! Constant-only regression
//!
//! ```text
//! Δy_t = c + γ y_{t-1} + Σ_{j=1..L} φ_j Δy_{t-j} + ε_t
//! ```
//!
//! with `L` chosen by AIC over `0..=ceil(12 (n/100)^{1/4})` (capped at
//! `n/2 - 2`) on a common sample, then refit on the largest sample for that `L`.
//! The statistic is the t-value of `γ`; p-values use MacKinnon's (1994)
//! response-surface approximation for one variable with a constant.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::{diff, norm_cdf, ols};

/// p-values at or above this classify a series as non-stationary.
pub const NON_STATIONARY_P: f64 = 0.05;

const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

impl AdfResult {
    pub fn non_stationary(&self) -> bool {
        is_non_stationary(self.p_value)
    }
}

/// `p >= 0.05`: the unit-root null is not rejected.
pub fn is_non_stationary(p_value: f64) -> bool {
    p_value >= NON_STATIONARY_P
}

/// A unit-root test producing a p-value per series.
pub trait UnitRootTest {
    fn test(&self, series: &[f64]) -> Result<AdfResult, AppError>;
}

/// ADF with automatic AIC lag selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adf;

impl UnitRootTest for Adf {
    fn test(&self, series: &[f64]) -> Result<AdfResult, AppError> {
        adfuller(series)
    }
}

pub fn adfuller(x: &[f64]) -> Result<AdfResult, AppError> {
    let n = x.len();
    if x.iter().any(|v| !v.is_finite()) {
        return Err(AppError::estimation("adf", "series contains non-finite values"));
    }
    if n < 4 {
        return Err(AppError::estimation("adf", format!("sample of {n} is too short")));
    }
    if x.iter().all(|v| *v == x[0]) {
        return Err(AppError::estimation("adf", "series is constant"));
    }

    let ceiling = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let maxlag = ceiling.min(n / 2 - 2);
    let dx = diff(x);

    // Lag search on the sample trimmed for `maxlag`.
    let (y_full, x_full) = design(x, &dx, maxlag);
    let mut best: Option<(f64, usize)> = None;
    for lags in 0..=maxlag {
        let cols = 2 + lags;
        let exog = x_full.columns(0, cols).into_owned();
        let Some(fit) = ols(&exog, &y_full) else {
            continue;
        };
        let aic = fit.aic();
        if best.is_none_or(|(b, _)| aic < b) {
            best = Some((aic, lags));
        }
    }
    let (_, used_lag) =
        best.ok_or_else(|| AppError::estimation("adf", "no lag order produced a valid regression"))?;

    // Final regression: constant first, then y_{t-1} and the chosen lags.
    let (y, exog) = design(x, &dx, used_lag);
    let fit = ols(&exog, &y).ok_or_else(|| {
        AppError::estimation("adf", format!("singular regression at lag {used_lag}"))
    })?;
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return Err(AppError::estimation("adf", "test statistic is not finite"));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p(statistic)?,
        used_lag,
        nobs: y.len(),
    })
}

/// Endogenous `Δy_t` and regressors `[1, y_{t-1}, Δy_{t-1}, …, Δy_{t-lags}]`
/// for `t` where every lag is available.
fn design(x: &[f64], dx: &[f64], lags: usize) -> (DVector<f64>, DMatrix<f64>) {
    let rows = dx.len() - lags;
    let y = DVector::from_iterator(rows, (0..rows).map(|r| dx[r + lags]));
    let exog = DMatrix::from_fn(rows, 2 + lags, |r, c| {
        let t = r + lags;
        match c {
            0 => 1.0,
            1 => x[t],
            j => dx[t - (j - 1)],
        }
    });
    (y, exog)
}

/// MacKinnon approximate p-value, constant-only regression, one variable.
pub fn mackinnon_p(stat: f64) -> Result<f64, AppError> {
    if stat > TAU_MAX {
        return Ok(1.0);
    }
    if stat < TAU_MIN {
        return Ok(0.0);
    }
    let poly: &[f64] = if stat <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = poly.iter().rev().fold(0.0, |acc, c| acc * stat + c);
    norm_cdf(z)
}
