//! Residual diagnostics for the target equation.
//!
//! - sample autocorrelations for lags `1..=ACF_LAGS` (biased denominator)
//! - Bartlett 95% band: `z · sqrt((1 + 2 Σ_{j<k} r_j²) / n)`
//! - normal fit: mean and population std

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::ResidualDiagnostics;
use crate::error::AppError;
use crate::math::{mean, norm_ppf, std_dev_population};

pub const ACF_LAGS: usize = 24;

/// Autocorrelations for lags `1..=nlags`; lags at or beyond `n` are zero.
pub fn acf(x: &[f64], nlags: usize) -> Vec<f64> {
    let n = x.len();
    let m = mean(x);
    let denom: f64 = x.iter().map(|v| (v - m) * (v - m)).sum();
    (1..=nlags)
        .map(|k| {
            if k >= n || denom <= 0.0 {
                return 0.0;
            }
            let num: f64 = (k..n).map(|t| (x[t] - m) * (x[t - k] - m)).sum();
            num / denom
        })
        .collect()
}

/// Bartlett half-widths matching [`acf`] lag by lag.
pub fn bartlett_band(acf: &[f64], n: usize, z: f64) -> Vec<f64> {
    let mut cum = 0.0;
    acf.iter()
        .map(|r| {
            let w = z * ((1.0 + 2.0 * cum) / n as f64).sqrt();
            cum += r * r;
            w
        })
        .collect()
}

pub fn residual_diagnostics(index: Vec<NaiveDate>, residuals: Vec<f64>) -> Result<ResidualDiagnostics, AppError> {
    if index.len() != residuals.len() {
        return Err(AppError::estimation(
            "residual diagnostics",
            format!("{} dates for {} residuals", index.len(), residuals.len()),
        ));
    }
    if residuals.is_empty() {
        return Err(AppError::estimation("residual diagnostics", "no residuals"));
    }
    let z = norm_ppf(0.975)?;
    let r = acf(&residuals, ACF_LAGS);
    let band = bartlett_band(&r, residuals.len(), z);
    let normal_mean = mean(&residuals);
    let normal_std = std_dev_population(&residuals);
    debug!(n = residuals.len(), normal_mean, normal_std, "residual diagnostics");
    Ok(ResidualDiagnostics {
        index,
        residuals,
        acf: r,
        acf_band: band,
        normal_mean,
        normal_std,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn alternating_series_has_negative_first_lag() {
        let x: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = acf(&x, 3);
        assert_relative_eq!(r[0], -49.0 / 50.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], 48.0 / 50.0, epsilon = 1e-12);
    }

    #[test]
    fn band_widens_with_accumulated_autocorrelation() {
        let band = bartlett_band(&[0.5, 0.0, 0.0], 100, 1.96);
        assert_relative_eq!(band[0], 0.196, epsilon = 1e-12);
        assert_relative_eq!(band[1], 1.96 * (1.5f64 / 100.0).sqrt(), epsilon = 1e-12);
        assert_eq!(band[1], band[2]);
    }

    #[test]
    fn diagnostics_cover_all_lags() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let index: Vec<NaiveDate> = (0..10).map(|i| start + chrono::Days::new(i)).collect();
        let resid = vec![1.0, -1.0, 2.0, -2.0, 0.5, -0.5, 1.0, -1.0, 0.0, 0.0];
        let d = residual_diagnostics(index, resid).unwrap();
        assert_eq!(d.acf.len(), ACF_LAGS);
        assert_eq!(d.acf_band.len(), ACF_LAGS);
        assert_eq!(d.acf[20], 0.0);
        assert_relative_eq!(d.normal_mean, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn mismatched_index_is_rejected() {
        assert!(residual_diagnostics(vec![], vec![1.0]).is_err());
    }
}
