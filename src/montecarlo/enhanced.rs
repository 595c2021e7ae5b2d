//! Enhanced simulator: sector-aware targets, adaptive speed, optional
//! business cycle, Bayesian blending toward the sector prior, clamped values.

use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rayon::prelude::*;
use tracing::info;

use super::validation::validate_history;
use super::{RunContext, ShockMatrix, SimulatedPaths, assemble, historical_volatility, rng};
use crate::domain::{AdvancedConfig, Scenario, ScenarioAnchors, SimulationRequest, SimulationResult, SimulatorVariant};
use crate::error::AppError;

/// Simulated values never leave this range.
pub const VALUE_FLOOR: f64 = 0.1;
pub const VALUE_CEILING: f64 = 3.0;

/// Bounds on the cycle multiplier.
pub const CYCLE_FLOOR: f64 = 0.7;
pub const CYCLE_CEILING: f64 = 1.3;
/// Std of the noise added to the cycle wave.
pub const CYCLE_NOISE_STD: f64 = 0.05;

/// Market-neutral anchor the sector reference is blended against.
const NEUTRAL_ANCHOR: f64 = 1.0;

pub const PERCENTILE_LEVELS: [f64; 7] = [0.05, 0.10, 0.25, 0.50, 0.75, 0.90, 0.95];

/// Multipliers on the blended sector target (positive, negative).
const SECTOR_TILT: (f64, f64) = (0.9, 1.1);
/// Multipliers on the sector prior in the Bayesian blend (positive, negative).
const PRIOR_TILT: (f64, f64) = (0.95, 1.05);

fn tilt(scenario: Scenario, (pos, neg): (f64, f64)) -> f64 {
    match scenario {
        Scenario::Base => 1.0,
        Scenario::Positive => pos,
        Scenario::Negative => neg,
    }
}

/// Per-scenario update rule; everything that does not depend on the path value
/// is fixed at construction.
pub struct PathDynamics<'a> {
    config: &'a AdvancedConfig,
    anchors: &'a ScenarioAnchors,
    sector_reference: Option<f64>,
    horizon: usize,
}

impl<'a> PathDynamics<'a> {
    pub fn new(request: &'a SimulationRequest) -> Self {
        Self {
            config: &request.advanced,
            anchors: &request.anchors,
            sector_reference: request.sector_reference,
            horizon: request.horizon_years,
        }
    }

    /// Long-run target before the cycle multiplier.
    pub fn target(&self, scenario: Scenario) -> f64 {
        match self.sector_reference {
            Some(sector) => {
                let w = self.config.sector_weight;
                (sector * w + NEUTRAL_ANCHOR * (1.0 - w)) * tilt(scenario, SECTOR_TILT)
            }
            None => self.anchors.get(scenario).target,
        }
    }

    fn regime_factor(&self) -> f64 {
        match self.config.market_volatility {
            Some(v) if v > self.config.volatility_threshold => self.config.crisis_factor,
            _ => 1.0,
        }
    }

    /// Speed for a path currently at `value` in year `year` (0-based), capped at 1.
    pub fn speed(&self, scenario: Scenario, value: f64, year: usize) -> f64 {
        let base = self.anchors.get(scenario).speed;
        if !self.config.adaptive_speed {
            return base;
        }
        let target = self.target(scenario);
        let distance = (value - target).abs() / target.abs().max(0.5);
        let f_distance = 1.0 + distance * self.config.distance_sensitivity;
        let f_time = 1.0 + (year as f64 / self.horizon as f64) * self.config.time_acceleration;
        (base * f_distance * f_time * self.regime_factor()).min(1.0)
    }

    fn blend(&self, scenario: Scenario, value: f64) -> f64 {
        match self.sector_reference {
            Some(sector) if self.config.use_bayesian => {
                let prior = sector * tilt(scenario, PRIOR_TILT);
                let (cs, cm) = (self.config.sector_confidence, self.config.model_confidence);
                (cs * prior + cm * value) / (cs + cm)
            }
            _ => value,
        }
    }

    /// One year of one path.
    pub fn step(&self, scenario: Scenario, prev: f64, year: usize, cycle: f64, shock: f64) -> f64 {
        let target = self.target(scenario) * cycle;
        let speed = self.speed(scenario, prev, year);
        let next = prev + speed * (target - prev) + shock;
        self.blend(scenario, next).clamp(VALUE_FLOOR, VALUE_CEILING)
    }
}

/// Cycle multipliers for each projected year; all ones when the cycle is off.
///
/// Draws `horizon` noise values from `rng` only when the cycle is enabled.
pub fn cycle_factors(config: &AdvancedConfig, horizon: usize, rng: &mut StdRng) -> Result<Vec<f64>, AppError> {
    if !config.include_cycle {
        return Ok(vec![1.0; horizon]);
    }
    let noise = Normal::new(0.0, CYCLE_NOISE_STD)
        .map_err(|e| AppError::estimation("cycle noise", e.to_string()))?;
    let draws: Vec<f64> = (0..horizon).map(|_| rng.sample(noise)).collect();

    // Evenly spaced on [0, horizon] with both ends included.
    let step = if horizon > 1 {
        horizon as f64 / (horizon - 1) as f64
    } else {
        0.0
    };
    Ok(draws
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let wave = (2.0 * PI * i as f64 * step / config.cycle_period_years).sin();
            (1.0 + config.cycle_amplitude * (wave + e)).clamp(CYCLE_FLOOR, CYCLE_CEILING)
        })
        .collect())
}

/// Every path of every scenario, without aggregation.
pub fn simulate_paths(request: &SimulationRequest) -> Result<(SimulatedPaths, f64), AppError> {
    request.validate()?;
    let horizon = request.horizon_years;
    let n = request.num_paths;
    let last = request
        .history
        .last_value()
        .ok_or_else(|| AppError::config("history", "empty history"))?;
    let sigma = historical_volatility(&request.history.values);

    let mut rng = rng();
    let cycle = cycle_factors(&request.advanced, horizon, &mut rng)?;
    let shocks = ShockMatrix::draw(&mut rng, sigma, horizon, n)?;

    let dynamics = PathDynamics::new(request);
    let mut paths = SimulatedPaths::new(horizon);
    for year in 0..horizon {
        for (s, &scenario) in Scenario::ALL.iter().enumerate() {
            let rows = paths.get_mut(scenario);
            let prev = rows.last().cloned().unwrap_or_else(|| vec![last; n]);
            let next: Vec<f64> = prev
                .par_iter()
                .zip(shocks.get(year, s).par_iter())
                .map(|(&v, &e)| dynamics.step(scenario, v, year, cycle[year], e))
                .collect();
            rows.push(next);
        }
    }
    Ok((paths, sigma))
}

/// Run the enhanced simulator.
pub fn simulate(request: &SimulationRequest) -> Result<SimulationResult, AppError> {
    request.validate()?;
    let validation = validate_history(&request.history.values);
    let (paths, volatility) = simulate_paths(request)?;
    let result = assemble(
        &paths,
        RunContext {
            variant: SimulatorVariant::Enhanced,
            request,
            volatility,
            percentile_levels: &PERCENTILE_LEVELS,
            validation: Some(validation),
            config: Some(request.advanced.clone()),
        },
    )?;
    info!(
        horizon = request.horizon_years,
        paths = request.num_paths,
        volatility,
        sector = ?request.sector_reference,
        cycle = request.advanced.include_cycle,
        terminal_base = result.bundle.scenarios.base.last().copied().unwrap_or(f64::NAN),
        "enhanced simulation finished"
    );
    Ok(result)
}
