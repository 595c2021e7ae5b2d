//! Best-effort mean-reversion diagnostics on the simulator's history.
//!
//! Neither check can fail the run: an unusable history only leaves the
//! corresponding fields empty. No random draws happen here.

use tracing::{debug, info, warn};

use crate::domain::ValidationDiagnostics;
use crate::econometrics::adfuller;
use crate::math::{linregress, mean};

/// Paired observations the AR(1) half-life regression needs, exclusive.
pub const MIN_AR1_PAIRS: usize = 10;

/// ADF p-values below this mark the history as stationary.
pub const STATIONARY_P: f64 = 0.05;

/// Reversion speed, half-life and fit quality of an AR(1) on deviations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfLife {
    pub speed: f64,
    pub half_life: f64,
    pub r_squared: f64,
}

/// Regress `dev_t` on `dev_{t-1}` with `dev = x − mean(x)`.
///
/// Only slopes in `(0, 1)` describe mean reversion; anything else yields `None`.
pub fn half_life(values: &[f64]) -> Option<HalfLife> {
    let m = mean(values);
    let dev: Vec<f64> = values.iter().map(|v| v - m).collect();
    let pairs = dev.len().saturating_sub(1);
    if pairs <= MIN_AR1_PAIRS {
        debug!(pairs, "too few observations for half-life");
        return None;
    }
    let fit = linregress(&dev[..pairs], &dev[1..])?;
    if !(fit.slope > 0.0 && fit.slope < 1.0) {
        debug!(slope = fit.slope, "AR(1) slope outside (0, 1)");
        return None;
    }
    let speed = -fit.slope.ln();
    Some(HalfLife {
        speed,
        half_life: std::f64::consts::LN_2 / speed,
        r_squared: fit.r_value * fit.r_value,
    })
}

pub fn validate_history(values: &[f64]) -> ValidationDiagnostics {
    let mut out = ValidationDiagnostics::default();

    match adfuller(values) {
        Ok(adf) => {
            out.adf_p_value = Some(adf.p_value);
            out.is_stationary = Some(adf.p_value < STATIONARY_P);
        }
        Err(e) => warn!(error = %e, "stationarity check skipped"),
    }

    match half_life(values) {
        Some(hl) => {
            out.reversion_speed = Some(hl.speed);
            out.half_life = Some(hl.half_life);
            out.ar1_r_squared = Some(hl.r_squared);
        }
        None => warn!(n = values.len(), "half-life unavailable"),
    }

    info!(
        adf_p = ?out.adf_p_value,
        half_life = ?out.half_life,
        r_squared = ?out.ar1_r_squared,
        "history validation"
    );
    out
}
