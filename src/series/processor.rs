//! Derive modeled variables from the aligned monthly table.

use tracing::{debug, info};

use crate::domain::{Frame, Transform, VariableSpec};
use crate::error::AppError;

/// Months of lag in a year-over-year change.
pub const YOY_LAG: usize = 12;

pub struct SeriesProcessor<'a> {
    specs: &'a [VariableSpec],
}

impl<'a> SeriesProcessor<'a> {
    pub fn new(specs: &'a [VariableSpec]) -> Self {
        Self { specs }
    }

    /// One column per spec, in spec order; rows with any non-finite value dropped.
    pub fn process(&self, monthly: &Frame) -> Result<Frame, AppError> {
        let mut out = Frame::new(monthly.index().to_vec());
        for spec in self.specs {
            let values = derive(spec, monthly)?;
            debug!(variable = %spec.name, transform = spec.transform.label(), "derived column");
            out.push_column(spec.name.clone(), values)?;
        }

        let clean = out.drop_incomplete_rows();
        if clean.nrows() == 0 {
            return Err(AppError::config("series", "no complete rows after processing"));
        }
        info!(
            rows = clean.nrows(),
            cols = clean.ncols(),
            dropped = out.nrows() - clean.nrows(),
            "processed series"
        );
        Ok(clean)
    }
}

fn derive(spec: &VariableSpec, monthly: &Frame) -> Result<Vec<f64>, AppError> {
    let values: Vec<f64> = match &spec.transform {
        Transform::Level { source_col } => monthly.require(source_col)?.to_vec(),
        Transform::Log { source_col } => monthly.require(source_col)?.iter().map(|v| v.ln()).collect(),
        Transform::YoyPctChange { source_col } => {
            let src = monthly.require(source_col)?;
            let available = src.iter().filter(|v| v.is_finite()).count();
            if available <= YOY_LAG {
                return Err(AppError::config(
                    "series",
                    format!(
                        "'{}' needs at least {} months of '{source_col}', found {available}",
                        spec.name,
                        YOY_LAG + 1
                    ),
                ));
            }
            (0..src.len())
                .map(|t| {
                    if t < YOY_LAG {
                        f64::NAN
                    } else {
                        (src[t] / src[t - YOY_LAG] - 1.0) * 100.0
                    }
                })
                .collect()
        }
        Transform::Spread { source_cols } => {
            let a = monthly.require(&source_cols.0)?;
            let b = monthly.require(&source_cols.1)?;
            a.iter().zip(b).map(|(x, y)| x - y).collect()
        }
    };

    Ok(values
        .into_iter()
        .map(|v| if v.is_finite() { v } else { f64::NAN })
        .collect())
}
