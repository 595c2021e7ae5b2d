//! Projection request and result records.
//!
//! These types are serializable so they can be:
//!
//! - deserialized from JSON request files
//! - returned whole from the pipeline
//! - saved and reloaded as a session

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::frame::Frame;
use super::scenario::{ScenarioBundle, ScenarioOrientation, ScenarioParams};
use crate::error::AppError;

/// How one modeled variable is derived from raw source columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    Level { source_col: String },
    Log { source_col: String },
    /// `(x / x[t-12] - 1) * 100`; needs at least 13 months of source history.
    YoyPctChange { source_col: String },
    /// `a - b`.
    Spread { source_cols: (String, String) },
}

impl Transform {
    pub fn source_columns(&self) -> Vec<&str> {
        match self {
            Transform::Level { source_col }
            | Transform::Log { source_col }
            | Transform::YoyPctChange { source_col } => vec![source_col.as_str()],
            Transform::Spread { source_cols } => vec![source_cols.0.as_str(), source_cols.1.as_str()],
        }
    }

    /// Already a rate of change: never unit-root tested, never differenced.
    pub fn is_rate_of_change(&self) -> bool {
        matches!(self, Transform::YoyPctChange { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Transform::Level { .. } => "level",
            Transform::Log { .. } => "log",
            Transform::YoyPctChange { .. } => "yoy_pct_change",
            Transform::Spread { .. } => "spread",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub transform: Transform,
}

/// A raw series to fetch: the column name it lands in and the provider id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDefinition {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub target: String,
    #[serde(default)]
    pub regressors: Vec<String>,
    pub start_date: NaiveDate,
    pub horizon_years: usize,
}

impl ModelSpec {
    /// Modeled variables, target first, duplicates removed.
    pub fn variables(&self) -> Vec<String> {
        let mut out = vec![self.target.clone()];
        for r in &self.regressors {
            if !out.contains(r) {
                out.push(r.clone());
            }
        }
        out
    }

    pub fn horizon_months(&self) -> usize {
        self.horizon_years * 12
    }
}

/// Everything `project` needs besides credentials and the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub series: Vec<SeriesDefinition>,
    pub variables: Vec<VariableSpec>,
    pub model: ModelSpec,
    #[serde(default)]
    pub scenarios: ScenarioParams,
    #[serde(default)]
    pub orientation: ScenarioOrientation,
}

impl ProjectionRequest {
    /// Structural checks that need no data.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.model.horizon_years == 0 {
            return Err(AppError::config("model", "horizon_years must be at least 1"));
        }
        for name in self.model.variables() {
            if self.variable(&name).is_none() {
                return Err(AppError::config(
                    "variables",
                    format!("model variable '{name}' has no variable spec"),
                ));
            }
        }
        for spec in &self.variables {
            if let Transform::Spread { source_cols } = &spec.transform {
                if source_cols.0 == source_cols.1 {
                    return Err(AppError::config(
                        "variables",
                        format!("spread '{}' needs two distinct source columns", spec.name),
                    ));
                }
            }
        }
        self.scenarios.validate()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Model family that produced the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelKind {
    Var,
    Vecm,
}

impl ModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Var => "VAR",
            ModelKind::Vecm => "VECM",
        }
    }
}

/// What was fitted, created once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "UPPERCASE")]
pub enum FitResult {
    Var {
        lag_order: usize,
        differenced_variables: Vec<String>,
    },
    Vecm {
        /// Lagged differences in the error-correction form.
        lag_order: usize,
        cointegration_rank: usize,
        deterministic_term: String,
    },
}

impl FitResult {
    pub fn kind(&self) -> ModelKind {
        match self {
            FitResult::Var { .. } => ModelKind::Var,
            FitResult::Vecm { .. } => ModelKind::Vecm,
        }
    }

    pub fn lag_order(&self) -> usize {
        match self {
            FitResult::Var { lag_order, .. } | FitResult::Vecm { lag_order, .. } => *lag_order,
        }
    }
}

/// ADF outcome for one tested variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityOutcome {
    pub variable: String,
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub non_stationary: bool,
}

/// One row of the Johansen trace table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    /// Null hypothesis `rank <= r`.
    pub r: usize,
    pub eigenvalue: f64,
    pub statistic: f64,
    pub critical_95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDiagnostics {
    pub fit: FitResult,
    pub stationarity: Vec<StationarityOutcome>,
    pub non_stationary: Vec<String>,
    pub cointegration_rank: usize,
    /// Empty when fewer than two variables were non-stationary.
    pub trace: Vec<TraceRow>,
}

impl ModelDiagnostics {
    pub fn model_used(&self) -> ModelKind {
        self.fit.kind()
    }
}

/// Target-equation residuals with the checks analysts look at first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualDiagnostics {
    pub index: Vec<NaiveDate>,
    pub residuals: Vec<f64>,
    /// Autocorrelations for lags `1..=acf.len()`.
    pub acf: Vec<f64>,
    /// Bartlett 95% half-width per lag.
    pub acf_band: Vec<f64>,
    pub normal_mean: f64,
    pub normal_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub variable: String,
    pub orientation: ScenarioOrientation,
    /// Processed modeled variables, before any differencing.
    pub historical: Frame,
    pub monthly: ScenarioBundle<NaiveDate>,
    /// Calendar-year means of `monthly`.
    pub annual: ScenarioBundle<i32>,
    pub diagnostics: ModelDiagnostics,
    pub residuals: ResidualDiagnostics,
    pub model_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_json_is_internally_tagged() {
        let spec: VariableSpec = serde_json::from_str(
            r#"{"name":"inflation","transform":{"type":"yoy_pct_change","source_col":"cpi"}}"#,
        )
        .unwrap();
        assert!(spec.transform.is_rate_of_change());
        assert_eq!(spec.transform.source_columns(), vec!["cpi"]);

        let spread: Transform =
            serde_json::from_str(r#"{"type":"spread","source_cols":["mx10y","us10y"]}"#).unwrap();
        assert_eq!(spread.source_columns(), vec!["mx10y", "us10y"]);
    }

    #[test]
    fn spread_with_three_columns_is_rejected() {
        let res: Result<Transform, _> =
            serde_json::from_str(r#"{"type":"spread","source_cols":["a","b","c"]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn target_is_forced_first_in_variables() {
        let spec = ModelSpec {
            target: "inflation".into(),
            regressors: vec!["rate".into(), "inflation".into(), "fx".into()],
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            horizon_years: 5,
        };
        assert_eq!(spec.variables(), vec!["inflation", "rate", "fx"]);
        assert_eq!(spec.horizon_months(), 60);
    }
}
