//! Mean-reverting Monte Carlo scenario simulator.
//!
//! Each scenario evolves `num_paths` values per projected year:
//!
//! ```text
//! v_t = v_{t-1} + speed_t (target_t − v_{t-1}) + ε_t,   ε_t ~ N(0, σ_hist)
//! ```
//!
//! Two variants share the plumbing here:
//! - [`enhanced`]: adaptive speed, sector prior, cycle, Bayesian blend, clamp
//! - [`legacy`]: fixed speed and nothing else
//!
//! The generator is reseeded on every call. All random draws (cycle noise
//! first, then shocks by year, scenario, path) are taken up front in that
//! order, so the parallel path update cannot change the results.

pub mod enhanced;
pub mod legacy;
pub mod validation;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::domain::{
    AdvancedConfig, HistoricalSeries, Percentile, Scenario, ScenarioSet, SimulationRequest,
    SimulationResult, SimulatorVariant, ValidationDiagnostics,
};
use crate::error::AppError;
use crate::math::{diff, mean, median, quantiles, std_dev};
use crate::scenario::bundle;

pub use enhanced::simulate;
pub use legacy::simulate_legacy;

/// Fixed generator seed.
pub const SEED: u64 = 42;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// Sample std of annual differences; zero when only one difference exists.
pub fn historical_volatility(values: &[f64]) -> f64 {
    let d = diff(values);
    if d.len() < 2 { 0.0 } else { std_dev(&d) }
}

/// Pre-drawn shocks laid out as `[year][scenario][path]`.
pub struct ShockMatrix {
    data: Vec<f64>,
    paths: usize,
}

impl ShockMatrix {
    pub fn draw(rng: &mut StdRng, sigma: f64, years: usize, paths: usize) -> Result<Self, AppError> {
        let normal = Normal::new(0.0, sigma)
            .map_err(|e| AppError::estimation("shock distribution", format!("σ = {sigma}: {e}")))?;
        let data = (0..years * Scenario::ALL.len() * paths)
            .map(|_| rng.sample(normal))
            .collect();
        Ok(Self { data, paths })
    }

    pub fn get(&self, year: usize, scenario: usize) -> &[f64] {
        let start = (year * Scenario::ALL.len() + scenario) * self.paths;
        &self.data[start..start + self.paths]
    }
}

/// Every path value per scenario, `[year][path]`.
#[derive(Debug, Clone)]
pub struct SimulatedPaths {
    pub base: Vec<Vec<f64>>,
    pub positive: Vec<Vec<f64>>,
    pub negative: Vec<Vec<f64>>,
}

impl SimulatedPaths {
    pub fn new(years: usize) -> Self {
        Self {
            base: Vec::with_capacity(years),
            positive: Vec::with_capacity(years),
            negative: Vec::with_capacity(years),
        }
    }

    pub fn get(&self, scenario: Scenario) -> &[Vec<f64>] {
        match scenario {
            Scenario::Base => &self.base,
            Scenario::Positive => &self.positive,
            Scenario::Negative => &self.negative,
        }
    }

    pub fn get_mut(&mut self, scenario: Scenario) -> &mut Vec<Vec<f64>> {
        match scenario {
            Scenario::Base => &mut self.base,
            Scenario::Positive => &mut self.positive,
            Scenario::Negative => &mut self.negative,
        }
    }

    /// Cross-path median per year.
    pub fn medians(&self) -> ScenarioSet {
        let med = |rows: &[Vec<f64>]| -> Vec<f64> { rows.iter().map(|r| median(r)).collect() };
        ScenarioSet {
            base: med(&self.base),
            positive: med(&self.positive),
            negative: med(&self.negative),
        }
    }
}

/// Inputs to [`assemble`] beyond the paths themselves.
pub(crate) struct RunContext<'a> {
    pub variant: SimulatorVariant,
    pub request: &'a SimulationRequest,
    pub volatility: f64,
    pub percentile_levels: &'a [f64],
    pub validation: Option<ValidationDiagnostics>,
    pub config: Option<AdvancedConfig>,
}

pub(crate) fn assemble(paths: &SimulatedPaths, ctx: RunContext<'_>) -> Result<SimulationResult, AppError> {
    let history: &HistoricalSeries = &ctx.request.history;
    let last_year = history
        .last_year()
        .ok_or_else(|| AppError::config("history", "empty history"))?;
    let last_value = history
        .last_value()
        .ok_or_else(|| AppError::config("history", "empty history"))?;

    let horizon = ctx.request.horizon_years as i32;
    let years: Vec<i32> = (1..=horizon).map(|h| last_year + h).collect();

    let final_distribution = paths.base.last().cloned().unwrap_or_default();
    let percentiles = ctx
        .percentile_levels
        .iter()
        .zip(quantiles(&final_distribution, ctx.percentile_levels))
        .map(|(&level, value)| Percentile { level, value })
        .collect();

    Ok(SimulationResult {
        variant: ctx.variant,
        history: history.clone(),
        bundle: bundle(years, paths.medians()),
        historical_mean: mean(&history.values),
        last_value,
        volatility: ctx.volatility,
        final_distribution,
        percentiles,
        validation: ctx.validation,
        sector_reference: match ctx.variant {
            SimulatorVariant::Enhanced => ctx.request.sector_reference,
            SimulatorVariant::Legacy => None,
        },
        config: ctx.config,
    })
}
