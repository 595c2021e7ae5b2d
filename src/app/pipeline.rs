//! Shared projection pipeline used by the CLI commands and the cache.
//!
//! fetch -> align -> transform -> screen/select/fit -> forecast -> reconstruct
//! -> scenarios -> convergence -> annual bundle -> residual diagnostics
//!
//! Only the fetch touches the network; [`project_raw`] runs everything after it
//! and is a pure function of its inputs.

use chrono::NaiveDate;
use tracing::info;

use crate::data::{Credentials, RawSeries, fetch_all};
use crate::domain::{ModelDiagnostics, ProjectionRequest, ProjectionResult};
use crate::econometrics::{
    Adf, INTERVAL_ALPHA, JohansenTrace, ModelSelector, StationarityCointegrationAnalyzer,
};
use crate::error::AppError;
use crate::scenario::{
    Reconstruction, ScenarioConvergenceEngine, annual, bundle, reconstruct, scenarios_from_bounds,
};
use crate::series::{SeriesProcessor, align_monthly, month_range, next_month};

/// Monthly forecast resolution.
pub const PERIODS_PER_YEAR: usize = 12;

/// Fetch every raw series, then run [`project_raw`].
pub fn project(
    request: &ProjectionRequest,
    credentials: &Credentials,
    as_of: NaiveDate,
) -> Result<ProjectionResult, AppError> {
    request.validate()?;
    let source = credentials.source()?;
    let raw = fetch_all(source.as_ref(), &request.series, request.model.start_date, as_of)?;
    project_raw(request, &raw, as_of)
}

/// Run the pipeline on already-fetched raw series.
pub fn project_raw(
    request: &ProjectionRequest,
    raw: &[RawSeries],
    as_of: NaiveDate,
) -> Result<ProjectionResult, AppError> {
    request.validate()?;
    let target = request.model.target.clone();
    let target_spec = request
        .variable(&target)
        .ok_or_else(|| AppError::config("model", format!("no variable spec for target '{target}'")))?;

    // 1) Monthly table of raw columns, then modeled variables.
    let monthly = align_monthly(raw, as_of)?;
    let processed = SeriesProcessor::new(&request.variables).process(&monthly)?;

    let names = request.model.variables();
    let specs: Vec<_> = names
        .iter()
        .filter_map(|n| request.variable(n).cloned())
        .collect();
    let frame = processed.select(&names)?;
    let last_observed = frame
        .require(&target)?
        .last()
        .copied()
        .ok_or_else(|| AppError::config("model", format!("target '{target}' has no observations")))?;
    let last_date = frame
        .last_date()
        .ok_or_else(|| AppError::config("model", "processed table is empty"))?;

    // 2) Screening, model choice and fit.
    let adf = Adf;
    let johansen = JohansenTrace;
    let selector = ModelSelector::new(StationarityCointegrationAnalyzer::new(&adf, &johansen));
    let estimation = selector.select_and_fit(&frame, &specs)?;

    // 3) Forecast with intervals, back to levels where the target was differenced.
    let steps = request.model.horizon_months();
    let mut paths = estimation.fitted.forecast(steps, INTERVAL_ALPHA)?;
    let plan = Reconstruction::plan(estimation.was_differenced(&target), &target_spec.transform);
    reconstruct(&mut paths, 0, last_observed, plan);

    // 4) Scenarios for the target column, converged toward the anchors.
    let column = |m: &nalgebra::DMatrix<f64>| m.column(0).iter().copied().collect::<Vec<f64>>();
    let mut set = scenarios_from_bounds(
        column(&paths.point),
        column(&paths.lower),
        column(&paths.upper),
        request.orientation,
    );
    ScenarioConvergenceEngine::new(&request.scenarios, PERIODS_PER_YEAR).apply(&mut set);

    let first = next_month(last_date);
    let index = month_range(first, add_months(first, steps.saturating_sub(1)));
    let monthly_bundle = bundle(index, set);
    let annual_bundle = annual(&monthly_bundle);

    // 5) Residual diagnostics on the target equation.
    let resid = estimation.fitted.residuals();
    let model_index = estimation.model_frame.index();
    let resid_index = model_index[model_index.len().saturating_sub(resid.nrows())..].to_vec();
    let residuals = crate::report::residual_diagnostics(resid_index, column(resid))?;

    let fit = estimation.fitted.fit_result();
    let model_summary = estimation.fitted.summary(estimation.model_frame.columns());
    info!(
        target = %target,
        model = fit.kind().display_name(),
        lags = fit.lag_order(),
        months = steps,
        "projection finished"
    );

    Ok(ProjectionResult {
        variable: target,
        orientation: request.orientation,
        historical: processed,
        monthly: monthly_bundle,
        annual: annual_bundle,
        diagnostics: ModelDiagnostics {
            fit,
            stationarity: estimation.analysis.stationarity.clone(),
            non_stationary: estimation.analysis.non_stationary.clone(),
            cointegration_rank: estimation.analysis.cointegration_rank,
            trace: estimation.analysis.trace.clone(),
        },
        residuals,
        model_summary,
    })
}

fn add_months(date: NaiveDate, months: usize) -> NaiveDate {
    (0..months).fold(date, |d, _| next_month(d))
}
