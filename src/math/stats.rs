//! Descriptive statistics over `f64` slices.
//!
//! Conventions match the tabular tooling analysts compare against:
//! sample standard deviation uses `n - 1`, quantiles interpolate linearly
//! between order statistics, the median of an even sample averages the two
//! middle values.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::AppError;

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (`n - 1` denominator). `NaN` below two points.
pub fn std_dev(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    var.sqrt()
}

/// Population standard deviation (ML estimate, `n` denominator).
pub fn std_dev_population(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64).sqrt()
}

pub fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// First differences `x[t] - x[t-1]`.
pub fn diff(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut v = xs.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Linear-interpolation quantile, `q ∈ [0, 1]`.
pub fn quantile(xs: &[f64], q: f64) -> f64 {
    quantile_sorted(&sorted(xs), q)
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Quantiles for several levels with a single sort.
pub fn quantiles(xs: &[f64], qs: &[f64]) -> Vec<f64> {
    let s = sorted(xs);
    qs.iter().map(|&q| quantile_sorted(&s, q)).collect()
}

pub fn median(xs: &[f64]) -> f64 {
    quantile(xs, 0.5)
}

fn standard_normal() -> Result<Normal, AppError> {
    Normal::new(0.0, 1.0).map_err(|e| AppError::estimation("normal distribution", e.to_string()))
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> Result<f64, AppError> {
    Ok(standard_normal()?.cdf(x))
}

/// Standard normal quantile.
pub fn norm_ppf(p: f64) -> Result<f64, AppError> {
    Ok(standard_normal()?.inverse_cdf(p))
}
