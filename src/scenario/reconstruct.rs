//! Undo first differencing of the target before scenarios are built.
//!
//! Applies only when a VAR was fitted on a differenced target; VECM output is
//! already in levels. The forecast of a differenced rate of change is a change
//! in the rate, so both cases rebuild with the same rule:
//! `level_h = last_observed + Σ_{i<=h} Δ_i`, applied to point, lower and upper.

use tracing::info;

use crate::econometrics::ForecastPaths;
use crate::domain::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconstruction {
    NotApplied,
    /// Differenced annual rate rebuilt from the last observed rate.
    Rate,
    /// Differenced level rebuilt from the last observed level.
    Level,
}

impl Reconstruction {
    pub fn plan(target_differenced: bool, transform: &Transform) -> Self {
        match (target_differenced, transform.is_rate_of_change()) {
            (false, _) => Reconstruction::NotApplied,
            (true, true) => Reconstruction::Rate,
            (true, false) => Reconstruction::Level,
        }
    }
}

/// Rebuild column `col` of every table in place.
pub fn reconstruct(paths: &mut ForecastPaths, col: usize, last_observed: f64, plan: Reconstruction) {
    if plan == Reconstruction::NotApplied {
        return;
    }
    for table in [&mut paths.point, &mut paths.lower, &mut paths.upper] {
        let mut level = last_observed;
        for h in 0..table.nrows() {
            level += table[(h, col)];
            table[(h, col)] = level;
        }
    }
    info!(?plan, last_observed, "target reconstructed from differences");
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn cumulative_sum_from_last_level_on_all_bounds() {
        let d = DMatrix::from_row_slice(3, 2, &[1.0, 9.0, 2.0, 9.0, -0.5, 9.0]);
        let mut paths = ForecastPaths {
            point: d.clone(),
            lower: d.clone() * 2.0,
            upper: d,
        };
        let plan = Reconstruction::plan(true, &Transform::Level { source_col: "x".into() });
        reconstruct(&mut paths, 0, 10.0, plan);
        let col = |m: &DMatrix<f64>| m.column(0).iter().copied().collect::<Vec<_>>();
        assert_eq!(col(&paths.point), vec![11.0, 13.0, 12.5]);
        assert_eq!(col(&paths.lower), vec![12.0, 16.0, 15.0]);
        assert_eq!(col(&paths.upper), vec![11.0, 13.0, 12.5]);
        // Other columns untouched.
        assert_eq!(paths.point[(2, 1)], 9.0);
    }

    #[test]
    fn not_differenced_means_untouched() {
        let plan = Reconstruction::plan(false, &Transform::YoyPctChange { source_col: "cpi".into() });
        assert_eq!(plan, Reconstruction::NotApplied);
        let d = DMatrix::from_element(2, 1, 1.0);
        let mut paths = ForecastPaths {
            point: d.clone(),
            lower: d.clone(),
            upper: d,
        };
        reconstruct(&mut paths, 0, 100.0, plan);
        assert_eq!(paths.point[(1, 0)], 1.0);
    }
}
