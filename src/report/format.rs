//! Formatted terminal output for both engines.
//!
//! Formatting stays here so the econometrics and simulation code returns plain
//! records and output changes remain local.

use std::fmt::Display;

use crate::domain::{
    FitResult, ProjectionResult, ResidualDiagnostics, Scenario, ScenarioBundle, SimulationResult,
    SimulatorVariant, ValidationDiagnostics,
};

/// Full projection report: model choice, diagnostics, annual scenarios.
pub fn format_projection(result: &ProjectionResult) -> String {
    let mut out = String::new();
    let d = &result.diagnostics;

    out.push_str("=== scen - Econometric Projection ===\n");
    out.push_str(&format!("Target: {}\n", result.variable));
    out.push_str(&format!("Orientation: {:?}\n", result.orientation));
    if let (Some(first), Some(last)) = (result.historical.index().first(), result.historical.last_date()) {
        out.push_str(&format!(
            "History: {first} .. {last} ({} months)\n",
            result.historical.nrows()
        ));
    }

    out.push_str("\nModel:\n");
    match &d.fit {
        FitResult::Var {
            lag_order,
            differenced_variables,
        } => {
            out.push_str(&format!("- VAR, lags={lag_order}\n"));
            if !differenced_variables.is_empty() {
                out.push_str(&format!("- differenced: {}\n", differenced_variables.join(", ")));
            }
        }
        FitResult::Vecm {
            lag_order,
            cointegration_rank,
            deterministic_term,
        } => {
            out.push_str(&format!(
                "- VECM, k_ar_diff={lag_order}, rank={cointegration_rank}\n"
            ));
            out.push_str(&format!("- deterministic: {deterministic_term}\n"));
        }
    }

    out.push_str("\nStationarity (ADF):\n");
    out.push_str(&header(&[("variable", 20), ("stat", 10), ("p-value", 10), ("lag", 5), ("unit root", 10)]));
    for s in &d.stationarity {
        out.push_str(
            format!(
                "{:<20} {:>10.4} {:>10.4} {:>5} {:>10}\n",
                truncate(&s.variable, 20),
                s.statistic,
                s.p_value,
                s.used_lag,
                if s.non_stationary { "yes" } else { "no" }
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if !d.trace.is_empty() {
        out.push_str(&format!("\nJohansen trace (rank={}):\n", d.cointegration_rank));
        out.push_str(&header(&[("r<=", 5), ("eigenvalue", 12), ("trace", 12), ("crit 95%", 12)]));
        for row in &d.trace {
            out.push_str(&format!(
                "{:<5} {:>12.5} {:>12.4} {:>12.4}\n",
                row.r, row.eigenvalue, row.statistic, row.critical_95
            ));
        }
    }

    out.push_str("\nAnnual scenarios:\n");
    out.push_str(&format_bundle(&result.annual));
    out.push_str("\nSummary (monthly):\n");
    out.push_str(&format_summary(&result.monthly, None));
    out.push('\n');
    out.push_str(&format_residuals(&result.residuals));

    out
}

/// Monte Carlo report: medians per year, summary, percentiles, validation.
pub fn format_simulation(result: &SimulationResult) -> String {
    let mut out = String::new();

    let title = match result.variant {
        SimulatorVariant::Enhanced => "Monte Carlo (enhanced)",
        SimulatorVariant::Legacy => "Monte Carlo (legacy)",
    };
    out.push_str(&format!("=== scen - {title} ===\n"));
    out.push_str(&format!(
        "History: {} years | last={:.4} | mean={:.4} | volatility={:.4}\n",
        result.history.values.len(),
        result.last_value,
        result.historical_mean,
        result.volatility
    ));
    if let Some(s) = result.sector_reference {
        out.push_str(&format!("Sector reference: {s:.4}\n"));
    }

    out.push_str("\nMedian paths:\n");
    out.push_str(&format_bundle(&result.bundle));
    out.push_str("\nSummary:\n");
    out.push_str(&format_summary(&result.bundle, Some(result.historical_mean)));

    out.push_str("\nFinal-year base distribution:\n");
    out.push_str(&header(&[("pct", 6), ("value", 12)]));
    for p in &result.percentiles {
        out.push_str(&format!("{:<6} {:>12.4}\n", format!("P{:.0}", p.level * 100.0), p.value));
    }

    if let Some(v) = &result.validation {
        out.push('\n');
        out.push_str(&format_validation(v));
    }

    out
}

fn format_validation(v: &ValidationDiagnostics) -> String {
    let mut out = String::from("Validation:\n");
    out.push_str(&format!("- ADF p-value   : {}\n", opt(v.adf_p_value)));
    out.push_str(&format!(
        "- stationary    : {}\n",
        v.is_stationary.map_or("n/a".to_string(), |b| b.to_string())
    ));
    out.push_str(&format!("- half-life (y) : {}\n", opt(v.half_life)));
    out.push_str(&format!("- AR(1) R²      : {}\n", opt(v.ar1_r_squared)));
    out
}

fn format_residuals(r: &ResidualDiagnostics) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Residuals (target): n={} | mean={:.4} | std={:.4}\n",
        r.residuals.len(),
        r.normal_mean,
        r.normal_std
    ));
    let outside: Vec<String> = r
        .acf
        .iter()
        .zip(&r.acf_band)
        .enumerate()
        .filter(|(_, (a, b))| a.abs() > **b)
        .map(|(k, _)| (k + 1).to_string())
        .collect();
    if outside.is_empty() {
        out.push_str("ACF: all lags inside the 95% band\n");
    } else {
        out.push_str(&format!("ACF: lags outside the 95% band: {}\n", outside.join(", ")));
    }
    out
}

/// One row per period, one column per scenario.
pub fn format_bundle<I: Display>(bundle: &ScenarioBundle<I>) -> String {
    let mut out = header(&[("period", 12), ("base", 12), ("positive", 12), ("negative", 12)]);
    let s = &bundle.scenarios;
    for (i, period) in bundle.index.iter().enumerate() {
        out.push_str(&format!(
            "{:<12} {:>12.4} {:>12.4} {:>12.4}\n",
            period.to_string(),
            s.base[i],
            s.positive[i],
            s.negative[i]
        ));
    }
    out
}

/// Mean/std/min/max per scenario, with an optional "Historic" average row.
pub fn format_summary<I>(bundle: &ScenarioBundle<I>, historic_mean: Option<f64>) -> String {
    let mut out = header(&[("scenario", 10), ("mean", 12), ("std", 12), ("min", 12), ("max", 12)]);
    if let Some(m) = historic_mean {
        out.push_str(&format!("{:<10} {:>12.4}\n", "Historic", m));
    }
    for s in Scenario::ALL.into_iter().filter_map(|sc| bundle.summary_for(sc)) {
        out.push_str(&format!(
            "{:<10} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            s.scenario.label(),
            s.mean,
            s.std,
            s.min,
            s.max
        ));
    }
    out
}

fn header(cols: &[(&str, usize)]) -> String {
    let names: Vec<String> = cols
        .iter()
        .enumerate()
        .map(|(i, &(name, w))| if i == 0 { format!("{name:<w$}") } else { format!("{name:>w$}") })
        .collect();
    let rules: Vec<String> = cols.iter().map(|(_, w)| "-".repeat(*w)).collect();
    format!("{}\n{}\n", names.join(" ").trim_end(), rules.join(" "))
}

fn opt(v: Option<f64>) -> String {
    v.map_or("n/a".to_string(), |x| format!("{x:.4}"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScenarioSet;
    use crate::scenario::bundle;

    #[test]
    fn bundle_table_has_one_row_per_period() {
        let b = bundle(
            vec![2025, 2026],
            ScenarioSet {
                base: vec![1.0, 2.0],
                positive: vec![0.5, 1.5],
                negative: vec![1.5, 2.5],
            },
        );
        let s = format_bundle(&b);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("period"));
        assert!(lines[2].starts_with("2025"));
        assert!(lines[3].contains("2.5000"));
    }

    #[test]
    fn summary_lists_historic_first() {
        let b = bundle(
            vec![1],
            ScenarioSet {
                base: vec![1.0],
                positive: vec![1.0],
                negative: vec![1.0],
            },
        );
        let s = format_summary(&b, Some(0.25));
        assert!(s.lines().nth(2).unwrap().starts_with("Historic"));
        let order: Vec<&str> = s.lines().skip(3).filter_map(|l| l.split_whitespace().next()).collect();
        assert_eq!(order, vec!["Base", "Positive", "Negative"]);
        assert_eq!(s.lines().count(), 6);
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("inflation", 20), "inflation");
        assert_eq!(truncate("abcdef", 4), "abc.");
    }
}
