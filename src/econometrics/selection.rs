//! VAR vs VECM decision and estimation.
//!
//! Rules:
//! 1. cointegration rank > 0: VECM in levels with that rank,
//!    `k_ar_diff = max(1, p_aic - 1)`
//! 2. otherwise: VAR after differencing every non-stationary variable once
//!    (rate-of-change variables are never differenced)
//!
//! `p_aic` always comes from VAR lag selection on the table that is fitted.

use tracing::info;

use super::analyzer::{Analysis, StationarityCointegrationAnalyzer};
use super::model::FittedModel;
use super::var::{default_maxlags, fit_var, select_order};
use super::vecm::fit_vecm;
use crate::domain::{Frame, VariableSpec};
use crate::error::AppError;

/// Everything estimation produced for one run.
#[derive(Debug, Clone)]
pub struct Estimation {
    pub analysis: Analysis,
    pub fitted: FittedModel,
    /// The table the model was fitted on (differenced where applicable).
    pub model_frame: Frame,
}

impl Estimation {
    pub fn was_differenced(&self, name: &str) -> bool {
        match &self.fitted {
            FittedModel::Var { differenced, .. } => differenced.iter().any(|d| d == name),
            FittedModel::Vecm { .. } => false,
        }
    }
}

pub struct ModelSelector<'a> {
    analyzer: StationarityCointegrationAnalyzer<'a>,
}

impl<'a> ModelSelector<'a> {
    pub fn new(analyzer: StationarityCointegrationAnalyzer<'a>) -> Self {
        Self { analyzer }
    }

    /// `frame` holds the modeled variables, target first.
    pub fn select_and_fit(&self, frame: &Frame, specs: &[VariableSpec]) -> Result<Estimation, AppError> {
        let analysis = self.analyzer.analyze(frame, specs)?;

        if analysis.cointegration_rank > 0 {
            let levels = frame.to_matrix();
            let maxlags = default_maxlags(levels.nrows(), levels.ncols());
            let p = select_order(&levels, maxlags)?.selected;
            let k_ar_diff = p.saturating_sub(1).max(1);
            let model = fit_vecm(&levels, k_ar_diff, analysis.cointegration_rank)?;
            info!(rank = analysis.cointegration_rank, k_ar_diff, "model: VECM");
            return Ok(Estimation {
                analysis,
                fitted: FittedModel::Vecm { model },
                model_frame: frame.clone(),
            });
        }

        let differenced = differencing_plan(&analysis, specs);
        let mut model_frame = frame.clone();
        for name in &differenced {
            model_frame.difference_column(name)?;
        }
        let model_frame = model_frame.drop_incomplete_rows();

        let data = model_frame.to_matrix();
        let maxlags = default_maxlags(data.nrows(), data.ncols());
        let p = select_order(&data, maxlags)?.selected;
        let model = fit_var(&data, p, 0)?;
        info!(lags = p, differenced = ?differenced, "model: VAR");

        Ok(Estimation {
            analysis,
            fitted: FittedModel::Var { model, differenced },
            model_frame,
        })
    }
}

/// Non-stationary variables that get differenced before a VAR.
pub fn differencing_plan(analysis: &Analysis, specs: &[VariableSpec]) -> Vec<String> {
    analysis
        .non_stationary
        .iter()
        .filter(|name| {
            !specs
                .iter()
                .any(|s| &s.name == *name && s.transform.is_rate_of_change())
        })
        .cloned()
        .collect()
}
