//! Legacy simulator: fixed per-scenario speed toward the user anchor.
//!
//! No sector prior, cycle, blending or clamping. Draw order matches the
//! enhanced simulator with the cycle switched off.

use rayon::prelude::*;
use tracing::info;

use super::{RunContext, ShockMatrix, SimulatedPaths, assemble, historical_volatility, rng};
use crate::domain::{Scenario, SimulationRequest, SimulationResult, SimulatorVariant};
use crate::error::AppError;

pub const PERCENTILE_LEVELS: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

pub fn simulate_legacy_paths(request: &SimulationRequest) -> Result<(SimulatedPaths, f64), AppError> {
    request.validate()?;
    let horizon = request.horizon_years;
    let n = request.num_paths;
    let last = request
        .history
        .last_value()
        .ok_or_else(|| AppError::config("history", "empty history"))?;
    let sigma = historical_volatility(&request.history.values);

    let mut rng = rng();
    let shocks = ShockMatrix::draw(&mut rng, sigma, horizon, n)?;

    let mut paths = SimulatedPaths::new(horizon);
    for year in 0..horizon {
        for (s, &scenario) in Scenario::ALL.iter().enumerate() {
            let anchor = request.anchors.get(scenario);
            let rows = paths.get_mut(scenario);
            let prev = rows.last().cloned().unwrap_or_else(|| vec![last; n]);
            let next: Vec<f64> = prev
                .par_iter()
                .zip(shocks.get(year, s).par_iter())
                .map(|(&v, &e)| v + anchor.speed * (anchor.target - v) + e)
                .collect();
            rows.push(next);
        }
    }
    Ok((paths, sigma))
}

pub fn simulate_legacy(request: &SimulationRequest) -> Result<SimulationResult, AppError> {
    let (paths, volatility) = simulate_legacy_paths(request)?;
    let result = assemble(
        &paths,
        RunContext {
            variant: SimulatorVariant::Legacy,
            request,
            volatility,
            percentile_levels: &PERCENTILE_LEVELS,
            validation: None,
            config: None,
        },
    )?;
    info!(
        horizon = request.horizon_years,
        paths = request.num_paths,
        volatility,
        terminal_base = result.bundle.scenarios.base.last().copied().unwrap_or(f64::NAN),
        "legacy simulation finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdvancedConfig, Anchor, HistoricalSeries, ScenarioAnchors};
    use crate::montecarlo::enhanced;

    fn request(values: Vec<f64>, horizon: usize, paths: usize) -> SimulationRequest {
        let years = (0..values.len() as i32).map(|i| 2000 + i).collect();
        SimulationRequest {
            history: HistoricalSeries { years, values },
            horizon_years: horizon,
            num_paths: paths,
            anchors: ScenarioAnchors {
                base: Anchor { target: 40.0, speed: 0.08 },
                positive: Anchor { target: 35.0, speed: 0.06 },
                negative: Anchor { target: 45.0, speed: 0.10 },
            },
            sector_reference: Some(1.0),
            advanced: AdvancedConfig::default(),
        }
    }

    #[test]
    fn unclamped_and_without_extras() {
        let req = request(vec![30.0, 34.0, 31.0, 36.0], 4, 50);
        let r = simulate_legacy(&req).unwrap();
        assert!(r.validation.is_none());
        assert!(r.config.is_none());
        assert!(r.sector_reference.is_none());
        assert_eq!(r.percentiles.len(), 5);
        // Far above the enhanced ceiling.
        assert!(r.bundle.scenarios.base.iter().all(|v| *v > 10.0));
    }

    #[test]
    fn matches_enhanced_when_extras_are_off() {
        // Low volatility keeps every value far from the enhanced clamp.
        let mut req = request(vec![1.0, 1.02, 0.99, 1.01, 1.0], 3, 20);
        req.sector_reference = None;
        req.advanced.adaptive_speed = false;
        req.advanced.use_bayesian = false;
        req.anchors.base = Anchor { target: 1.0, speed: 0.2 };
        req.anchors.positive = Anchor { target: 0.9, speed: 0.2 };
        req.anchors.negative = Anchor { target: 1.3, speed: 0.2 };

        let (legacy, _) = simulate_legacy_paths(&req).unwrap();
        let (enh, _) = enhanced::simulate_paths(&req).unwrap();
        for s in Scenario::ALL {
            assert_eq!(legacy.get(s), enh.get(s));
        }
        assert_eq!(legacy.get(Scenario::Base).len(), 3);
    }
}
