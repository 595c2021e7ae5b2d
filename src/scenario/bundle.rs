//! Scenario extraction, summary statistics and annual resampling.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{Scenario, ScenarioBundle, ScenarioOrientation, ScenarioSet, ScenarioSummary};
use crate::math::{max, mean, min, std_dev};

/// Base is the point forecast; bounds map to positive/negative per orientation.
pub fn scenarios_from_bounds(
    point: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    orientation: ScenarioOrientation,
) -> ScenarioSet {
    let (positive, negative) = orientation.assign(lower, upper);
    ScenarioSet {
        base: point,
        positive,
        negative,
    }
}

/// Mean, sample std, min and max for each scenario; std is 0 for a single period.
pub fn summarize(set: &ScenarioSet) -> Vec<ScenarioSummary> {
    Scenario::ALL
        .iter()
        .map(|&scenario| {
            let v = set.get(scenario);
            ScenarioSummary {
                scenario,
                mean: mean(v),
                std: if v.len() < 2 { 0.0 } else { std_dev(v) },
                min: min(v),
                max: max(v),
            }
        })
        .collect()
}

pub fn bundle<I>(index: Vec<I>, scenarios: ScenarioSet) -> ScenarioBundle<I> {
    let summary = summarize(&scenarios);
    ScenarioBundle {
        index,
        scenarios,
        summary,
    }
}

/// Calendar-year means of a monthly bundle; partial years average what they have.
pub fn annual(monthly: &ScenarioBundle<NaiveDate>) -> ScenarioBundle<i32> {
    let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, d) in monthly.index.iter().enumerate() {
        groups.entry(d.year()).or_default().push(i);
    }

    let resample = |values: &[f64]| -> Vec<f64> {
        groups
            .values()
            .map(|rows| rows.iter().map(|&r| values[r]).sum::<f64>() / rows.len() as f64)
            .collect()
    };

    let set = ScenarioSet {
        base: resample(&monthly.scenarios.base),
        positive: resample(&monthly.scenarios.positive),
        negative: resample(&monthly.scenarios.negative),
    };
    bundle(groups.keys().copied().collect(), set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::month_range;

    #[test]
    fn summary_uses_sample_std() {
        let set = ScenarioSet {
            base: vec![1.0, 2.0, 3.0],
            positive: vec![0.0, 0.0, 0.0],
            negative: vec![5.0, 7.0, 9.0],
        };
        let s = summarize(&set);
        assert_eq!(s[0].scenario, Scenario::Base);
        assert_eq!(s[0].mean, 2.0);
        assert_eq!(s[0].std, 1.0);
        assert_eq!(s[2].min, 5.0);
        assert_eq!(s[2].max, 9.0);
    }

    #[test]
    fn annual_means_group_by_calendar_year() {
        let index = month_range(
            NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        );
        let n = index.len();
        let base: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let monthly = bundle(
            index,
            ScenarioSet {
                base: base.clone(),
                positive: base.clone(),
                negative: base,
            },
        );
        let yearly = annual(&monthly);
        assert_eq!(yearly.index, vec![2024, 2025]);
        assert_eq!(yearly.scenarios.base[0], 0.5);
        // months 2..=13 average to 7.5
        assert_eq!(yearly.scenarios.base[1], 7.5);
    }

    #[test]
    fn orientation_decides_bound_labels() {
        let set = scenarios_from_bounds(vec![2.0], vec![1.0], vec![3.0], ScenarioOrientation::CostLike);
        assert_eq!(set.positive, vec![1.0]);
        assert_eq!(set.negative, vec![3.0]);
        let set = scenarios_from_bounds(vec![2.0], vec![1.0], vec![3.0], ScenarioOrientation::ReturnLike);
        assert_eq!(set.positive, vec![3.0]);
    }
}
