use approx::assert_relative_eq;
use chrono::NaiveDate;

use macro_scenarios::app::pipeline::project_raw;
use macro_scenarios::data::RawSeries;
use macro_scenarios::domain::{
    FitResult, ModelKind, ModelSpec, ProjectionRequest, ScenarioOrientation, ScenarioParams,
    SeriesDefinition, Transform, VariableSpec,
};
use macro_scenarios::series::{month_range, next_month};

/// Deterministic uniform noise on `[-0.5, 0.5)`.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as f64 / (1u64 << 31) as f64) - 0.5
    }
}

fn months(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
    let end = (1..n).fold(start, |d, _| next_month(d));
    month_range(start, end)
}

fn series(name: &str, values: Vec<f64>) -> RawSeries {
    RawSeries {
        name: name.into(),
        observations: months(values.len()).into_iter().zip(values).collect(),
    }
}

fn request(target: VariableSpec, regressor: VariableSpec) -> ProjectionRequest {
    ProjectionRequest {
        series: vec![
            SeriesDefinition { name: "a".into(), id: "A".into() },
            SeriesDefinition { name: "b".into(), id: "B".into() },
        ],
        model: ModelSpec {
            target: target.name.clone(),
            regressors: vec![regressor.name.clone()],
            start_date: NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
            horizon_years: 3,
        },
        variables: vec![target, regressor],
        scenarios: ScenarioParams::default(),
        orientation: ScenarioOrientation::CostLike,
    }
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
}

#[test]
fn inflation_target_runs_a_var_and_converges_after_transition() {
    // Price index whose annual rate follows an AR(1) around 4%.
    let n = 192;
    let mut noise = Lcg(3);
    let mut rate = vec![4.0; n];
    let mut cpi = vec![100.0; n];
    for t in 1..n {
        rate[t] = 4.0 + 0.8 * (rate[t - 1] - 4.0) + noise.next();
        if t >= 12 {
            cpi[t] = cpi[t - 12] * (1.0 + rate[t] / 100.0);
        } else {
            cpi[t] = 100.0 + t as f64 * 0.3;
        }
    }
    let mut gap = vec![0.0; n];
    for t in 1..n {
        gap[t] = 0.5 * gap[t - 1] + noise.next();
    }

    let req = request(
        VariableSpec {
            name: "inflation".into(),
            transform: Transform::YoyPctChange { source_col: "a".into() },
        },
        VariableSpec {
            name: "gap".into(),
            transform: Transform::Level { source_col: "b".into() },
        },
    );
    let raw = vec![series("a", cpi), series("b", gap)];
    let res = project_raw(&req, &raw, as_of()).unwrap();

    assert_eq!(res.variable, "inflation");
    assert_eq!(res.diagnostics.model_used(), ModelKind::Var);
    // Rate-of-change variables are never unit-root tested.
    assert!(res.diagnostics.stationarity.iter().all(|s| s.variable != "inflation"));
    assert!(res.diagnostics.fit.lag_order() >= 1);
    assert_eq!(res.historical.nrows(), n - 12);

    let s = &res.monthly.scenarios;
    assert_eq!(s.base.len(), 36);
    assert_eq!(res.monthly.index[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert!(s.positive[0] <= s.base[0] && s.base[0] <= s.negative[0]);

    // Month 24 onward follows prev + speed (target - prev).
    for t in 24..36 {
        assert_relative_eq!(s.base[t], s.base[t - 1] + 0.1 * (3.0 - s.base[t - 1]), epsilon = 1e-9);
        assert_relative_eq!(s.positive[t], s.positive[t - 1] + 0.1 * (2.5 - s.positive[t - 1]), epsilon = 1e-9);
        assert_relative_eq!(s.negative[t], s.negative[t - 1] + 0.1 * (4.0 - s.negative[t - 1]), epsilon = 1e-9);
    }

    assert_eq!(res.annual.index, vec![2024, 2025, 2026]);
    assert_eq!(res.residuals.acf.len(), 24);
    assert_eq!(res.residuals.index.len(), res.residuals.residuals.len());
    assert!(res.model_summary.contains("inflation"));
}

#[test]
fn trending_pair_is_fitted_as_a_full_rank_vecm() {
    // Both compound at 1% a month; b tracks 2a.
    let n = 180;
    let mut noise = Lcg(17);
    let mut a = vec![1.0; n];
    for t in 1..n {
        a[t] = a[t - 1] * 1.01 + 0.05 * noise.next();
    }
    let b: Vec<f64> = a.iter().map(|x| 2.0 * x + 0.05 * noise.next()).collect();

    let req = request(
        VariableSpec {
            name: "a_lvl".into(),
            transform: Transform::Level { source_col: "a".into() },
        },
        VariableSpec {
            name: "b_lvl".into(),
            transform: Transform::Level { source_col: "b".into() },
        },
    );
    let raw = vec![series("a", a), series("b", b)];
    let res = project_raw(&req, &raw, as_of()).unwrap();
    assert_eq!(res, project_raw(&req, &raw, as_of()).unwrap());

    let mut flagged = res.diagnostics.non_stationary.clone();
    flagged.sort();
    assert_eq!(flagged, vec!["a_lvl".to_string(), "b_lvl".to_string()]);
    assert!(!res.diagnostics.trace.is_empty());

    assert_eq!(res.diagnostics.cointegration_rank, 2);
    match &res.diagnostics.fit {
        FitResult::Vecm { cointegration_rank, lag_order, .. } => {
            assert_eq!(*cointegration_rank, 2);
            assert!(*lag_order >= 1);
        }
        other => panic!("expected a VECM, got {:?}", other.kind()),
    }
    assert!(res.monthly.scenarios.base.iter().all(|v| v.is_finite()));
    assert_eq!(res.monthly.scenarios.base.len(), 36);
}
