//! Monte Carlo request, configuration and result records.

use serde::{Deserialize, Serialize};

use super::scenario::{ScenarioAnchors, ScenarioBundle};
use crate::error::AppError;

/// Annual history the simulator starts from (year, value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl HistoricalSeries {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.years.len() != self.values.len() {
            return Err(AppError::config(
                "history",
                format!("{} years for {} values", self.years.len(), self.values.len()),
            ));
        }
        if self.values.len() < 2 {
            return Err(AppError::config("history", "at least two annual observations are required"));
        }
        if self.years.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AppError::config("history", "years must be strictly increasing"));
        }
        if let Some(pos) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(AppError::config(
                "history",
                format!("value for year {} is not finite", self.years[pos]),
            ));
        }
        Ok(())
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Every recognised enhanced-simulator option, with its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    /// Weight of the sector reference against the market-neutral anchor 1.0.
    pub sector_weight: f64,
    pub distance_sensitivity: f64,
    pub time_acceleration: f64,
    /// Externally observed market volatility; no regime switch when absent.
    pub market_volatility: Option<f64>,
    pub volatility_threshold: f64,
    pub crisis_factor: f64,
    pub sector_confidence: f64,
    pub model_confidence: f64,
    pub include_cycle: bool,
    pub cycle_period_years: f64,
    pub cycle_amplitude: f64,
    pub use_bayesian: bool,
    /// When false each scenario keeps its base speed.
    pub adaptive_speed: bool,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            sector_weight: 0.7,
            distance_sensitivity: 0.3,
            time_acceleration: 0.1,
            market_volatility: None,
            volatility_threshold: 0.25,
            crisis_factor: 1.5,
            sector_confidence: 0.3,
            model_confidence: 0.7,
            include_cycle: false,
            cycle_period_years: 7.0,
            cycle_amplitude: 0.15,
            use_bayesian: true,
            adaptive_speed: true,
        }
    }
}

impl AdvancedConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=1.0).contains(&self.sector_weight) {
            return Err(AppError::config("advanced", "sector_weight must lie in [0, 1]"));
        }
        if self.sector_confidence < 0.0
            || self.model_confidence < 0.0
            || self.sector_confidence + self.model_confidence <= 0.0
        {
            return Err(AppError::config(
                "advanced",
                "confidences must be non-negative with a positive sum",
            ));
        }
        if self.include_cycle && self.cycle_period_years <= 0.0 {
            return Err(AppError::config("advanced", "cycle_period_years must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorVariant {
    Enhanced,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// May be left out of a request file when a history CSV is supplied.
    #[serde(default)]
    pub history: HistoricalSeries,
    pub horizon_years: usize,
    pub num_paths: usize,
    #[serde(default)]
    pub anchors: ScenarioAnchors,
    /// Sector reference value; enhanced simulator only.
    #[serde(default)]
    pub sector_reference: Option<f64>,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

impl SimulationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        self.history.validate()?;
        if self.horizon_years == 0 {
            return Err(AppError::config("simulation", "horizon_years must be at least 1"));
        }
        if self.num_paths == 0 {
            return Err(AppError::config("simulation", "num_paths must be at least 1"));
        }
        if let Some(s) = self.sector_reference {
            if !s.is_finite() {
                return Err(AppError::config("simulation", "sector_reference is not finite"));
            }
        }
        self.anchors.validate()?;
        self.advanced.validate()
    }
}

/// Best-effort checks on the history; each field is `None` when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationDiagnostics {
    pub adf_p_value: Option<f64>,
    pub is_stationary: Option<bool>,
    pub reversion_speed: Option<f64>,
    pub half_life: Option<f64>,
    pub ar1_r_squared: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    pub level: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub variant: SimulatorVariant,
    pub history: HistoricalSeries,
    /// Cross-path medians per projected year.
    pub bundle: ScenarioBundle<i32>,
    pub historical_mean: f64,
    pub last_value: f64,
    pub volatility: f64,
    /// Base-scenario values of every path at the final year.
    pub final_distribution: Vec<f64>,
    pub percentiles: Vec<Percentile>,
    pub validation: Option<ValidationDiagnostics>,
    pub sector_reference: Option<f64>,
    pub config: Option<AdvancedConfig>,
}
