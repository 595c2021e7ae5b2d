//! Pull scenario paths toward long-run anchors after the transition period.
//!
//! From `transition_period` on, each value becomes
//! `prev + speed · (target − prev)` where `prev` is the already-adjusted
//! previous value, so the recursion runs strictly in order.

use tracing::info;

use crate::domain::{ConvergenceParams, Scenario, ScenarioParams, ScenarioSet};

/// Adjust one path in place. No-op when the transition is beyond the horizon.
pub fn converge(path: &mut [f64], params: &ConvergenceParams) {
    let start = params.transition_period;
    if start >= path.len() {
        return;
    }
    for i in start..path.len() {
        let prev = if i > 0 { path[i - 1] } else { path[0] };
        path[i] = prev + params.speed * (params.target_level - prev);
    }
}

pub struct ScenarioConvergenceEngine<'a> {
    params: &'a ScenarioParams,
    periods_per_year: usize,
}

impl<'a> ScenarioConvergenceEngine<'a> {
    pub fn new(params: &'a ScenarioParams, periods_per_year: usize) -> Self {
        Self {
            params,
            periods_per_year,
        }
    }

    pub fn apply(&self, set: &mut ScenarioSet) {
        for scenario in Scenario::ALL {
            let p = self.params.convergence(scenario, self.periods_per_year);
            converge(set.get_mut(scenario), &p);
            info!(
                scenario = scenario.label(),
                from = p.transition_period,
                target = p.target_level,
                speed = p.speed,
                "convergence applied"
            );
        }
    }
}
