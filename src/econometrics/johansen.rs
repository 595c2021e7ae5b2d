//! Johansen reduced-rank regression and trace test.
//!
//! Both the cointegration-rank test and the VECM estimator solve the same
//! eigenproblem on residual moment matrices:
//!
//! ```text
//! S11^{-1/2} S10 S00^{-1} S01 S11^{-1/2} v = λ v
//! ```
//!
//! where `R0` are short-run-purged differences and `R1` short-run-purged lagged
//! levels. The symmetric form is used so `SymmetricEigen` applies.

use nalgebra::{DMatrix, SymmetricEigen};
use tracing::debug;

use crate::error::AppError;
use crate::math::regression_residuals;

/// Trace critical values (90%, 95%, 99%), constant term, indexed by
/// `variables - rank - 1`.
const TRACE_CRIT: [[f64; 3]; 12] = [
    [2.7055, 3.8415, 6.6349],
    [13.4294, 15.4943, 19.9349],
    [27.0669, 29.7961, 35.4628],
    [44.4929, 47.8545, 54.6815],
    [65.8202, 69.8189, 77.8202],
    [91.1090, 95.7542, 104.9637],
    [120.3673, 125.6185, 135.9825],
    [153.6341, 159.5290, 171.0905],
    [190.8714, 197.3772, 210.0366],
    [232.1030, 239.2468, 253.2526],
    [277.3740, 285.1402, 300.2821],
    [326.5354, 334.9795, 351.2150],
];

pub const MAX_VARIABLES: usize = TRACE_CRIT.len();

/// Moment matrices and sorted eigen-decomposition of a reduced-rank problem.
#[derive(Debug, Clone)]
pub struct ReducedRank {
    pub s00: DMatrix<f64>,
    pub s01: DMatrix<f64>,
    pub s11: DMatrix<f64>,
    pub s11_inv_sqrt: DMatrix<f64>,
    /// Descending.
    pub eigenvalues: Vec<f64>,
    /// Columns ordered like `eigenvalues`.
    pub eigenvectors: DMatrix<f64>,
}

impl ReducedRank {
    /// `r0` and `r1` hold one observation per row.
    pub fn new(r0: &DMatrix<f64>, r1: &DMatrix<f64>, stage: &str) -> Result<Self, AppError> {
        let t = r0.nrows();
        if t == 0 || r1.nrows() != t {
            return Err(AppError::estimation(stage, "residual blocks are empty or misaligned"));
        }
        let tf = t as f64;
        let s00 = r0.transpose() * r0 / tf;
        let s01 = r0.transpose() * r1 / tf;
        let s11 = r1.transpose() * r1 / tf;

        let s00_inv = s00
            .clone()
            .try_inverse()
            .ok_or_else(|| AppError::estimation(stage, "singular S00 moment matrix"))?;
        let s11_inv_sqrt = inverse_sqrt(&s11, stage)?;

        let m = &s11_inv_sqrt * s01.transpose() * s00_inv * &s01 * &s11_inv_sqrt;
        let sym = (&m + m.transpose()) * 0.5;
        let eig = SymmetricEigen::new(sym);

        let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

        let eigenvalues: Vec<f64> = order.iter().map(|&i| eig.eigenvalues[i]).collect();
        let eigenvectors = DMatrix::from_fn(eig.eigenvectors.nrows(), order.len(), |r, c| {
            eig.eigenvectors[(r, order[c])]
        });

        Ok(Self {
            s00,
            s01,
            s11,
            s11_inv_sqrt,
            eigenvalues,
            eigenvectors,
        })
    }
}

/// `A^{-1/2}` for a symmetric positive-definite `A`.
pub fn inverse_sqrt(a: &DMatrix<f64>, stage: &str) -> Result<DMatrix<f64>, AppError> {
    let eig = SymmetricEigen::new(a.clone());
    if eig.eigenvalues.iter().any(|&l| !(l > 0.0) || !l.is_finite()) {
        return Err(AppError::estimation(stage, "moment matrix is not positive definite"));
    }
    let d = DMatrix::from_diagonal(&eig.eigenvalues.map(|l| 1.0 / l.sqrt()));
    Ok(&eig.eigenvectors * d * eig.eigenvectors.transpose())
}

/// Subtract column means.
pub fn demean(m: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = m.clone();
    for mut col in out.column_iter_mut() {
        let mean = col.mean();
        col.add_scalar_mut(-mean);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct JohansenResult {
    pub eigenvalues: Vec<f64>,
    /// `trace[r]` tests `rank <= r`.
    pub trace: Vec<f64>,
    pub critical_95: Vec<f64>,
}

impl JohansenResult {
    /// Count of trace statistics above their 95% critical value.
    pub fn rank(&self) -> usize {
        self.trace
            .iter()
            .zip(&self.critical_95)
            .filter(|(stat, crit)| stat > crit)
            .count()
    }
}

/// A multivariate cointegration-rank test over level series (columns).
pub trait CointegrationRankTest {
    fn trace_test(&self, levels: &DMatrix<f64>) -> Result<JohansenResult, AppError>;
}

/// Johansen trace test with a constant and one lagged difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct JohansenTrace;

impl CointegrationRankTest for JohansenTrace {
    fn trace_test(&self, levels: &DMatrix<f64>) -> Result<JohansenResult, AppError> {
        coint_johansen(levels)
    }
}

pub fn coint_johansen(levels: &DMatrix<f64>) -> Result<JohansenResult, AppError> {
    const STAGE: &str = "johansen";
    let (n, k) = levels.shape();
    if k > MAX_VARIABLES {
        return Err(AppError::estimation(
            STAGE,
            format!("{k} variables exceed the {MAX_VARIABLES} with tabulated critical values"),
        ));
    }
    if n < k + 4 {
        return Err(AppError::estimation(STAGE, format!("{n} observations are too few for {k} variables")));
    }

    let x = demean(levels);
    let dx = DMatrix::from_fn(n - 1, k, |r, c| x[(r + 1, c)] - x[(r, c)]);
    let m = dx.nrows();

    let z = demean(&dx.rows(0, m - 1).into_owned());
    let dy = demean(&dx.rows(1, m - 1).into_owned());
    let lx = demean(&x.rows(1, n - 2).into_owned());

    let r0 = regression_residuals(&z, &dy)
        .ok_or_else(|| AppError::estimation(STAGE, "short-run regression of differences failed"))?;
    let rk = regression_residuals(&z, &lx)
        .ok_or_else(|| AppError::estimation(STAGE, "short-run regression of levels failed"))?;

    let rr = ReducedRank::new(&r0, &rk, STAGE)?;
    let t = r0.nrows() as f64;

    let mut trace = Vec::with_capacity(k);
    for i in 0..k {
        let mut stat = 0.0;
        for &l in &rr.eigenvalues[i..] {
            if !(l < 1.0) {
                return Err(AppError::estimation(STAGE, format!("eigenvalue {l} is not below one")));
            }
            stat -= t * (1.0 - l.max(0.0)).ln();
        }
        trace.push(stat);
    }
    let critical_95 = (0..k).map(|i| TRACE_CRIT[k - i - 1][1]).collect();

    debug!(?trace, eigenvalues = ?rr.eigenvalues, "johansen trace statistics");
    Ok(JohansenResult {
        eigenvalues: rr.eigenvalues,
        trace,
        critical_95,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn cointegrated_pair(n: usize) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(3);
        let mut trend = 0.0;
        let mut data = Vec::with_capacity(n * 2);
        for _ in 0..n {
            trend += rng.sample::<f64, _>(StandardNormal);
            let gap: f64 = 0.3 * rng.sample::<f64, _>(StandardNormal);
            data.push(trend);
            data.push(trend + gap);
        }
        DMatrix::from_row_slice(n, 2, &data)
    }

    #[test]
    fn common_trend_gives_positive_rank() {
        let res = coint_johansen(&cointegrated_pair(300)).unwrap();
        assert_eq!(res.trace.len(), 2);
        assert!(res.trace[0] > res.critical_95[0]);
        assert!(res.rank() >= 1);
        assert!(res.eigenvalues.iter().all(|l| (0.0..1.0).contains(l)));
        assert_eq!(res.critical_95, vec![15.4943, 3.8415]);
    }

    #[test]
    fn trace_is_non_increasing_in_r() {
        let res = coint_johansen(&cointegrated_pair(200)).unwrap();
        assert!(res.trace[0] >= res.trace[1]);
    }

    #[test]
    fn too_many_variables_is_rejected() {
        let levels = DMatrix::from_fn(100, 13, |r, c| (r * (c + 1)) as f64);
        assert!(matches!(coint_johansen(&levels), Err(AppError::Estimation { .. })));
    }

    #[test]
    fn inverse_sqrt_squares_to_inverse() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let s = inverse_sqrt(&a, "test").unwrap();
        let prod = &s * &s * &a;
        assert!((prod - DMatrix::identity(2, 2)).norm() < 1e-10);
    }
}
