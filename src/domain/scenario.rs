//! Scenario labels, convergence anchors and the three-path bundle both engines return.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Base,
    Positive,
    Negative,
}

impl Scenario {
    /// Fixed iteration order; the simulators draw shocks in this order.
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::Positive, Scenario::Negative];

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Base => "Base",
            Scenario::Positive => "Positive",
            Scenario::Negative => "Negative",
        }
    }
}

/// Long-run target and first-order convergence speed for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub target: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnchors {
    pub base: Anchor,
    pub positive: Anchor,
    pub negative: Anchor,
}

impl Default for ScenarioAnchors {
    fn default() -> Self {
        Self {
            base: Anchor { target: 3.0, speed: 0.1 },
            positive: Anchor { target: 2.5, speed: 0.1 },
            negative: Anchor { target: 4.0, speed: 0.1 },
        }
    }
}

impl ScenarioAnchors {
    pub fn get(&self, scenario: Scenario) -> Anchor {
        match scenario {
            Scenario::Base => self.base,
            Scenario::Positive => self.positive,
            Scenario::Negative => self.negative,
        }
    }

    /// Speeds must lie in `[0, 1]`; targets must be finite.
    pub fn validate(&self) -> Result<(), AppError> {
        for s in Scenario::ALL {
            let a = self.get(s);
            if !a.target.is_finite() {
                return Err(AppError::config("scenarios", format!("{} target is not finite", s.label())));
            }
            if !(0.0..=1.0).contains(&a.speed) {
                return Err(AppError::config(
                    "scenarios",
                    format!("{} speed {} outside [0, 1]", s.label(), a.speed),
                ));
            }
        }
        Ok(())
    }
}

/// Convergence settings for the projection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Years of untouched model forecast before convergence starts.
    pub transition_years: usize,
    pub anchors: ScenarioAnchors,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            transition_years: 2,
            anchors: ScenarioAnchors::default(),
        }
    }
}

impl ScenarioParams {
    pub fn validate(&self) -> Result<(), AppError> {
        self.anchors.validate()
    }

    /// Per-scenario parameters at `periods_per_year` resolution.
    pub fn convergence(&self, scenario: Scenario, periods_per_year: usize) -> ConvergenceParams {
        let anchor = self.anchors.get(scenario);
        ConvergenceParams {
            transition_period: self.transition_years * periods_per_year,
            target_level: anchor.target,
            speed: anchor.speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceParams {
    /// First period index (from forecast start) that is adjusted.
    pub transition_period: usize,
    pub target_level: f64,
    pub speed: f64,
}

/// Which interval bound counts as the favourable scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOrientation {
    /// Higher is worse (inflation, yields, spreads): upper bound is negative.
    #[default]
    CostLike,
    /// Higher is better: upper bound is positive.
    ReturnLike,
}

impl ScenarioOrientation {
    /// Returns `(positive, negative)` from the interval bounds.
    pub fn assign<T>(self, lower: T, upper: T) -> (T, T) {
        match self {
            ScenarioOrientation::CostLike => (lower, upper),
            ScenarioOrientation::ReturnLike => (upper, lower),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub base: Vec<f64>,
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
}

impl ScenarioSet {
    pub fn get(&self, scenario: Scenario) -> &[f64] {
        match scenario {
            Scenario::Base => &self.base,
            Scenario::Positive => &self.positive,
            Scenario::Negative => &self.negative,
        }
    }

    pub fn get_mut(&mut self, scenario: Scenario) -> &mut Vec<f64> {
        match scenario {
            Scenario::Base => &mut self.base,
            Scenario::Positive => &mut self.positive,
            Scenario::Negative => &mut self.negative,
        }
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Three aligned paths over a shared index plus per-scenario statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBundle<I> {
    pub index: Vec<I>,
    pub scenarios: ScenarioSet,
    pub summary: Vec<ScenarioSummary>,
}

impl<I> ScenarioBundle<I> {
    pub fn summary_for(&self, scenario: Scenario) -> Option<&ScenarioSummary> {
        self.summary.iter().find(|s| s.scenario == scenario)
    }
}
