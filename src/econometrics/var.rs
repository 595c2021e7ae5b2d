//! Vector autoregression with a constant, estimated equation-by-equation by OLS.
//!
//! Lag order is chosen by AIC over `0..=maxlags` with every trial fitted on the
//! same sample (the first `maxlags - p` rows are skipped for order `p`):
//!
//! ```text
//! AIC(p) = ln det Σ̂_mle + 2 (p k² + k) / T
//! ```

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use super::forecast::VarRepresentation;
use crate::error::AppError;
use crate::math::solve_least_squares;

/// Upper bound on trial lag orders.
pub const MAX_LAGS: usize = 12;

#[derive(Debug, Clone)]
pub struct VarModel {
    pub rep: VarRepresentation,
    /// `T × k` residuals, aligned with the last `T` rows of the input.
    pub residuals: DMatrix<f64>,
    /// Last `k_ar` observations, the forecast starting point.
    pub tail: DMatrix<f64>,
    pub nobs: usize,
    pub aic: f64,
}

impl VarModel {
    pub fn k_ar(&self) -> usize {
        self.rep.k_ar()
    }
}

/// AIC per trial order and the selected order.
#[derive(Debug, Clone)]
pub struct LagSelection {
    pub aic: Vec<f64>,
    pub selected: usize,
}

/// `min(12, n/4)`, reduced until the largest trial keeps positive residual df.
pub fn default_maxlags(nobs: usize, neqs: usize) -> usize {
    let mut maxlags = MAX_LAGS.min(nobs / 4);
    while maxlags > 0 && nobs - maxlags <= neqs * maxlags + 1 {
        maxlags -= 1;
    }
    maxlags
}

/// Fit order `p` on `data[offset..]` (rows are observations).
pub fn fit_var(data: &DMatrix<f64>, p: usize, offset: usize) -> Result<VarModel, AppError> {
    let (n, k) = data.shape();
    let start = offset + p;
    if n <= start {
        return Err(AppError::estimation("var", format!("{n} observations cannot support {p} lags")));
    }
    let t = n - start;
    let ncoef = 1 + k * p;
    if t <= ncoef {
        return Err(AppError::estimation(
            "var",
            format!("{t} usable observations for {ncoef} coefficients per equation"),
        ));
    }

    let y = data.rows(start, t).into_owned();
    let z = DMatrix::from_fn(t, ncoef, |r, c| {
        if c == 0 {
            return 1.0;
        }
        let lag = (c - 1) / k + 1;
        let var = (c - 1) % k;
        data[(start + r - lag, var)]
    });

    let b = solve_least_squares(&z, &y)
        .ok_or_else(|| AppError::estimation("var", format!("least squares failed at lag {p}")))?;
    let residuals = &y - &z * &b;
    let sse = residuals.transpose() * &residuals;
    let sigma_mle = &sse / t as f64;
    let sigma_u = &sse / (t - ncoef) as f64;

    let coefs = (0..p)
        .map(|j| DMatrix::from_fn(k, k, |i, l| b[(1 + j * k + l, i)]))
        .collect();

    let det = sigma_mle.determinant();
    let aic = if det > 0.0 {
        det.ln() + 2.0 * (p * k * k + k) as f64 / t as f64
    } else {
        f64::INFINITY
    };

    Ok(VarModel {
        rep: VarRepresentation {
            intercept: b.row(0).transpose(),
            coefs,
            sigma_u,
        },
        residuals,
        tail: data.rows(n - p, p).into_owned(),
        nobs: t,
        aic,
    })
}

/// Fit every order in parallel on a common sample and take the first AIC minimum.
pub fn select_order(data: &DMatrix<f64>, maxlags: usize) -> Result<LagSelection, AppError> {
    let aic: Vec<f64> = (0..=maxlags)
        .into_par_iter()
        .map(|p| {
            fit_var(data, p, maxlags - p)
                .map(|m| m.aic)
                .unwrap_or(f64::INFINITY)
        })
        .collect();

    let mut selected = None;
    for (p, &v) in aic.iter().enumerate() {
        if v.is_finite() && selected.is_none_or(|s: usize| v < aic[s]) {
            selected = Some(p);
        }
    }
    let selected = selected
        .ok_or_else(|| AppError::estimation("lag selection", "no lag order produced a finite AIC"))?;
    debug!(maxlags, selected, ?aic, "var lag order selected");
    Ok(LagSelection { aic, selected })
}
