//! A fitted VAR or VECM behind one forecasting interface.

use std::fmt::Write as _;

use nalgebra::DMatrix;

use super::forecast::{ForecastPaths, VarRepresentation};
use super::var::VarModel;
use super::vecm::{DETERMINISTIC_TERM, VecmModel};
use crate::domain::FitResult;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub enum FittedModel {
    Var {
        model: VarModel,
        /// Columns differenced once before fitting.
        differenced: Vec<String>,
    },
    Vecm {
        model: VecmModel,
    },
}

impl FittedModel {
    pub fn fit_result(&self) -> FitResult {
        match self {
            FittedModel::Var { model, differenced } => FitResult::Var {
                lag_order: model.k_ar(),
                differenced_variables: differenced.clone(),
            },
            FittedModel::Vecm { model } => FitResult::Vecm {
                lag_order: model.k_ar_diff,
                cointegration_rank: model.rank,
                deterministic_term: DETERMINISTIC_TERM.to_string(),
            },
        }
    }

    pub fn representation(&self) -> VarRepresentation {
        match self {
            FittedModel::Var { model, .. } => model.rep.clone(),
            FittedModel::Vecm { model } => model.var_representation(),
        }
    }

    /// `T × k` residuals aligned with the last `T` rows of the model table.
    pub fn residuals(&self) -> &DMatrix<f64> {
        match self {
            FittedModel::Var { model, .. } => &model.residuals,
            FittedModel::Vecm { model } => &model.residuals,
        }
    }

    fn tail(&self) -> &DMatrix<f64> {
        match self {
            FittedModel::Var { model, .. } => &model.tail,
            FittedModel::Vecm { model } => &model.tail,
        }
    }

    /// Point, lower and upper paths in the model's own units.
    pub fn forecast(&self, steps: usize, alpha: f64) -> Result<ForecastPaths, AppError> {
        self.representation().forecast_interval(self.tail(), steps, alpha)
    }

    /// Plain-text coefficient summary.
    pub fn summary(&self, names: &[String]) -> String {
        let mut out = String::new();
        match self {
            FittedModel::Var { model, differenced } => {
                let _ = writeln!(out, "VAR  lags={}  nobs={}  aic={:.4}", model.k_ar(), model.nobs, model.aic);
                if !differenced.is_empty() {
                    let _ = writeln!(out, "differenced: {}", differenced.join(", "));
                }
                write_equations(&mut out, names, &model.rep);
            }
            FittedModel::Vecm { model } => {
                let _ = writeln!(
                    out,
                    "VECM  lagged differences={}  rank={}  deterministic={}",
                    model.k_ar_diff, model.rank, DETERMINISTIC_TERM
                );
                let _ = writeln!(out, "\nLoadings (alpha)");
                for (i, name) in names.iter().enumerate() {
                    let row: Vec<String> = (0..model.rank).map(|j| format!("{:>10.4}", model.alpha[(i, j)])).collect();
                    let _ = writeln!(out, "  {name:<16}{}", row.join(""));
                }
                let _ = writeln!(out, "\nCointegrating vectors (beta)");
                let labels: Vec<&str> = names.iter().map(String::as_str).chain(["const"]).collect();
                for (i, name) in labels.iter().enumerate() {
                    let row: Vec<String> = (0..model.rank).map(|j| format!("{:>10.4}", model.beta[(i, j)])).collect();
                    let _ = writeln!(out, "  {name:<16}{}", row.join(""));
                }
                for i in 0..model.k_ar_diff {
                    let _ = writeln!(out, "\nGamma_{}", i + 1);
                    write_matrix(&mut out, names, &model.gamma_block(i));
                }
            }
        }
        out
    }
}

fn write_equations(out: &mut String, names: &[String], rep: &VarRepresentation) {
    let _ = writeln!(out, "\nIntercept");
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(out, "  {name:<16}{:>10.4}", rep.intercept[i]);
    }
    for (j, a) in rep.coefs.iter().enumerate() {
        let _ = writeln!(out, "\nA_{}", j + 1);
        write_matrix(out, names, a);
    }
}

fn write_matrix(out: &mut String, names: &[String], m: &DMatrix<f64>) {
    let header: String = names.iter().map(|n| format!("{n:>12.12}")).collect();
    let _ = writeln!(out, "  {:<16}{header}", "");
    for (i, name) in names.iter().enumerate() {
        let row: String = (0..m.ncols()).map(|c| format!("{:>12.4}", m[(i, c)])).collect();
        let _ = writeln!(out, "  {name:<16}{row}");
    }
}
