//! Level-VAR forecasting with MSE-based intervals.
//!
//! Both VAR and VECM forecast through the same representation
//!
//! ```text
//! y_t = c + A_1 y_{t-1} + … + A_p y_{t-p} + u_t,   Cov(u_t) = Σ_u
//! ```
//!
//! Intervals use the MA(∞) weights `Φ_0 = I`, `Φ_i = Σ_{j=1..min(i,p)} Φ_{i-j} A_j`
//! and `MSE(h) = Σ_{i<h} Φ_i Σ_u Φ_iᵀ`.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::norm_ppf;

/// Two-sided interval level used for scenario bounds.
pub const INTERVAL_ALPHA: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct VarRepresentation {
    pub intercept: DVector<f64>,
    /// `coefs[j]` is `A_{j+1}`.
    pub coefs: Vec<DMatrix<f64>>,
    pub sigma_u: DMatrix<f64>,
}

/// Point forecast and bounds, one row per step, one column per variable.
#[derive(Debug, Clone)]
pub struct ForecastPaths {
    pub point: DMatrix<f64>,
    pub lower: DMatrix<f64>,
    pub upper: DMatrix<f64>,
}

impl VarRepresentation {
    pub fn k_ar(&self) -> usize {
        self.coefs.len()
    }

    pub fn neqs(&self) -> usize {
        self.intercept.len()
    }

    /// Iterate the recursion from the last `k_ar` rows of `history`.
    pub fn forecast(&self, history: &DMatrix<f64>, steps: usize) -> Result<DMatrix<f64>, AppError> {
        let p = self.k_ar();
        let k = self.neqs();
        if p == 0 {
            return Err(AppError::forecast("model has no autoregressive lags (k_ar = 0)"));
        }
        if history.nrows() < p || history.ncols() != k {
            return Err(AppError::forecast(format!(
                "need {p} rows of {k} variables to start the forecast, got {}x{}",
                history.nrows(),
                history.ncols()
            )));
        }

        // Rolling window: most recent observation last.
        let mut window: Vec<DVector<f64>> = (history.nrows() - p..history.nrows())
            .map(|r| history.row(r).transpose())
            .collect();
        let mut out = DMatrix::zeros(steps, k);
        for h in 0..steps {
            let mut y = self.intercept.clone();
            for (j, a) in self.coefs.iter().enumerate() {
                y += a * &window[window.len() - 1 - j];
            }
            out.set_row(h, &y.transpose());
            window.remove(0);
            window.push(y);
        }
        Ok(out)
    }

    /// MA weights `Φ_0..Φ_{steps-1}`.
    pub fn ma_rep(&self, steps: usize) -> Vec<DMatrix<f64>> {
        let k = self.neqs();
        let p = self.k_ar();
        let mut phis: Vec<DMatrix<f64>> = Vec::with_capacity(steps);
        for i in 0..steps {
            if i == 0 {
                phis.push(DMatrix::identity(k, k));
                continue;
            }
            let mut phi = DMatrix::zeros(k, k);
            for j in 1..=i.min(p) {
                phi += &phis[i - j] * &self.coefs[j - 1];
            }
            phis.push(phi);
        }
        phis
    }

    /// Forecast error covariance for horizons `1..=steps`.
    pub fn mse(&self, steps: usize) -> Vec<DMatrix<f64>> {
        let mut acc = DMatrix::zeros(self.neqs(), self.neqs());
        self.ma_rep(steps)
            .into_iter()
            .map(|phi| {
                acc += &phi * &self.sigma_u * phi.transpose();
                acc.clone()
            })
            .collect()
    }

    pub fn forecast_interval(
        &self,
        history: &DMatrix<f64>,
        steps: usize,
        alpha: f64,
    ) -> Result<ForecastPaths, AppError> {
        if self.sigma_u.iter().any(|v| !v.is_finite()) {
            return Err(AppError::forecast("residual covariance is not finite"));
        }
        let point = self.forecast(history, steps)?;
        let z = norm_ppf(1.0 - alpha / 2.0).map_err(|e| AppError::forecast(e.to_string()))?;

        let k = self.neqs();
        let mut lower = point.clone();
        let mut upper = point.clone();
        for (h, mse) in self.mse(steps).iter().enumerate() {
            for i in 0..k {
                let var = mse[(i, i)];
                if !(var >= 0.0) {
                    return Err(AppError::forecast(format!(
                        "negative forecast variance at step {} for equation {i}",
                        h + 1
                    )));
                }
                let half = z * var.sqrt();
                lower[(h, i)] -= half;
                upper[(h, i)] += half;
            }
        }
        Ok(ForecastPaths { point, lower, upper })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ar1(phi: f64, c: f64, sigma2: f64) -> VarRepresentation {
        VarRepresentation {
            intercept: DVector::from_element(1, c),
            coefs: vec![DMatrix::from_element(1, 1, phi)],
            sigma_u: DMatrix::from_element(1, 1, sigma2),
        }
    }

    #[test]
    fn ar1_point_forecast_and_mse() {
        let rep = ar1(0.5, 1.0, 2.0);
        let hist = DMatrix::from_element(1, 1, 4.0);
        let paths = rep.forecast_interval(&hist, 3, INTERVAL_ALPHA).unwrap();
        // 1 + 0.5*4 = 3, then 2.5, then 2.25
        assert_abs_diff_eq!(paths.point[(0, 0)], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(paths.point[(2, 0)], 2.25, epsilon = 1e-12);

        // MSE(2) = σ²(1 + φ²) = 2.5
        let mse = rep.mse(2);
        assert_abs_diff_eq!(mse[1][(0, 0)], 2.5, epsilon = 1e-12);
        let half = paths.upper[(1, 0)] - paths.point[(1, 0)];
        assert_abs_diff_eq!(half, 1.959964 * 2.5f64.sqrt(), epsilon = 1e-4);
        assert_abs_diff_eq!(paths.point[(1, 0)] - paths.lower[(1, 0)], half, epsilon = 1e-12);
    }

    #[test]
    fn zero_lags_is_a_forecast_error() {
        let rep = VarRepresentation {
            intercept: DVector::zeros(2),
            coefs: Vec::new(),
            sigma_u: DMatrix::identity(2, 2),
        };
        let err = rep.forecast(&DMatrix::zeros(1, 2), 5).unwrap_err();
        assert!(matches!(err, AppError::Forecast { .. }));
    }
}
