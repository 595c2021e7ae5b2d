//! Vector error-correction model, Johansen ML estimation.
//!
//! ```text
//! Δy_t = α β' [y_{t-1}; 1] + Σ_{i=1..d} Γ_i Δy_{t-i} + u_t
//! ```
//!
//! The constant lives inside the cointegration relation (last row of `β`).
//! `β` is normalised so its top `r × r` block is the identity.

use nalgebra::DMatrix;
use tracing::debug;

use super::forecast::VarRepresentation;
use super::johansen::ReducedRank;
use crate::error::AppError;
use crate::math::{regression_residuals, solve_least_squares};

const STAGE: &str = "vecm";

/// Deterministic term label used in summaries.
pub const DETERMINISTIC_TERM: &str = "constant inside cointegration relation";

#[derive(Debug, Clone)]
pub struct VecmModel {
    pub k_ar_diff: usize,
    pub rank: usize,
    /// `k × r` loadings.
    pub alpha: DMatrix<f64>,
    /// `(k + 1) × r` cointegrating vectors, constant in the last row.
    pub beta: DMatrix<f64>,
    /// `k × (k · k_ar_diff)`, `[Γ_1 … Γ_d]`.
    pub gamma: DMatrix<f64>,
    /// ML residual covariance.
    pub sigma_u: DMatrix<f64>,
    pub residuals: DMatrix<f64>,
    /// Last `k_ar_diff + 1` level observations.
    pub tail: DMatrix<f64>,
    pub eigenvalues: Vec<f64>,
}

impl VecmModel {
    pub fn neqs(&self) -> usize {
        self.alpha.nrows()
    }

    /// `Π = α β'`, `k × (k + 1)`.
    pub fn pi(&self) -> DMatrix<f64> {
        &self.alpha * self.beta.transpose()
    }

    pub fn gamma_block(&self, i: usize) -> DMatrix<f64> {
        let k = self.neqs();
        self.gamma.columns(i * k, k).into_owned()
    }

    /// Equivalent level VAR of order `k_ar_diff + 1`.
    pub fn var_representation(&self) -> VarRepresentation {
        let k = self.neqs();
        let d = self.k_ar_diff;
        let pi = self.pi();

        let mut coefs = Vec::with_capacity(d + 1);
        coefs.push(DMatrix::identity(k, k) + pi.columns(0, k) + self.gamma_block(0));
        for i in 1..d {
            coefs.push(self.gamma_block(i) - self.gamma_block(i - 1));
        }
        coefs.push(-self.gamma_block(d - 1));

        VarRepresentation {
            intercept: pi.column(k).into_owned(),
            coefs,
            sigma_u: self.sigma_u.clone(),
        }
    }
}

/// Fit on level data (rows are observations).
pub fn fit_vecm(levels: &DMatrix<f64>, k_ar_diff: usize, rank: usize) -> Result<VecmModel, AppError> {
    let (n, k) = levels.shape();
    if k_ar_diff == 0 {
        return Err(AppError::estimation(STAGE, "at least one lagged difference is required"));
    }
    if rank == 0 || rank >= k + 1 {
        return Err(AppError::estimation(STAGE, format!("cointegration rank {rank} invalid for {k} variables")));
    }
    let k_ar = k_ar_diff + 1;
    if n <= k_ar + k * k_ar_diff + 1 {
        return Err(AppError::estimation(
            STAGE,
            format!("{n} observations are too few for {k_ar_diff} lagged differences"),
        ));
    }
    let t = n - k_ar;

    let diff_at = |row: usize, c: usize| levels[(row, c)] - levels[(row - 1, c)];
    let dy = DMatrix::from_fn(t, k, |r, c| diff_at(r + k_ar, c));
    let y_lag1 = DMatrix::from_fn(t, k + 1, |r, c| {
        if c == k { 1.0 } else { levels[(r + k_ar - 1, c)] }
    });
    let dx = DMatrix::from_fn(t, k * k_ar_diff, |r, c| {
        let lag = c / k + 1;
        diff_at(r + k_ar - lag, c % k)
    });

    let r0 = regression_residuals(&dx, &dy)
        .ok_or_else(|| AppError::estimation(STAGE, "short-run regression of differences failed"))?;
    let r1 = regression_residuals(&dx, &y_lag1)
        .ok_or_else(|| AppError::estimation(STAGE, "short-run regression of levels failed"))?;
    let rr = ReducedRank::new(&r0, &r1, STAGE)?;

    let beta_tilde = &rr.s11_inv_sqrt * rr.eigenvectors.columns(0, rank);
    let top = beta_tilde
        .rows(0, rank)
        .into_owned()
        .try_inverse()
        .ok_or_else(|| AppError::estimation(STAGE, "cannot normalise cointegrating vectors"))?;
    let beta = &beta_tilde * top;

    let btsb = (beta.transpose() * &rr.s11 * &beta)
        .try_inverse()
        .ok_or_else(|| AppError::estimation(STAGE, "singular β' S11 β"))?;
    let alpha = &rr.s01 * &beta * btsb;

    let pi = &alpha * beta.transpose();
    let adjusted = &dy - &y_lag1 * pi.transpose();
    let gamma = solve_least_squares(&dx, &adjusted)
        .ok_or_else(|| AppError::estimation(STAGE, "short-run coefficient regression failed"))?
        .transpose();

    let residuals = adjusted - &dx * gamma.transpose();
    let sigma_u = residuals.transpose() * &residuals / t as f64;

    debug!(rank, k_ar_diff, eigenvalues = ?rr.eigenvalues, "vecm fitted");
    Ok(VecmModel {
        k_ar_diff,
        rank,
        alpha,
        beta,
        gamma,
        sigma_u,
        residuals,
        tail: levels.rows(n - k_ar, k_ar).into_owned(),
        eigenvalues: rr.eigenvalues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    /// y2 tracks 2 + y1; y1 is a random walk.
    fn pair(n: usize) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(5);
        let mut y1 = 10.0;
        let mut gap = 0.0;
        let mut data = Vec::with_capacity(2 * n);
        for _ in 0..n {
            y1 += 0.5 * rng.sample::<f64, _>(StandardNormal);
            gap = 0.3 * gap + 0.2 * rng.sample::<f64, _>(StandardNormal);
            data.push(y1);
            data.push(y1 + 2.0 + gap);
        }
        DMatrix::from_row_slice(n, 2, &data)
    }

    #[test]
    fn cointegrating_vector_is_normalised_and_recovered() {
        let m = fit_vecm(&pair(400), 1, 1).unwrap();
        assert_eq!(m.beta.shape(), (3, 1));
        assert!((m.beta[(0, 0)] - 1.0).abs() < 1e-10);
        // y1 - y2 + 2 ≈ 0
        assert!((m.beta[(1, 0)] + 1.0).abs() < 0.05, "beta = {}", m.beta);
        assert!((m.beta[(2, 0)] - 2.0).abs() < 0.2, "beta = {}", m.beta);
        assert_eq!(m.residuals.shape(), (398, 2));
    }

    #[test]
    fn var_representation_has_k_ar_diff_plus_one_lags() {
        let m = fit_vecm(&pair(300), 2, 1).unwrap();
        let rep = m.var_representation();
        assert_eq!(rep.k_ar(), 3);
        // A_3 = -Γ_2
        assert!((&rep.coefs[2] + m.gamma_block(1)).norm() < 1e-12);
        // Σ A_i - I = Π[:, :k]
        let sum = &rep.coefs[0] + &rep.coefs[1] + &rep.coefs[2] - DMatrix::identity(2, 2);
        assert!((sum - m.pi().columns(0, 2)).norm() < 1e-10);
    }

    #[test]
    fn forecast_stays_near_equilibrium() {
        let data = pair(300);
        let m = fit_vecm(&data, 1, 1).unwrap();
        let paths = m.var_representation().forecast_interval(&m.tail, 24, 0.05).unwrap();
        let last = paths.point.nrows() - 1;
        let gap = paths.point[(last, 1)] - paths.point[(last, 0)];
        assert!((gap - 2.0).abs() < 0.3, "gap = {gap}");
    }
}
