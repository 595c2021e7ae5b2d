//! A small date-indexed, column-oriented table.
//!
//! Missing observations are stored as `NaN`; every consumer that needs complete
//! rows calls [`Frame::drop_incomplete_rows`] first.

use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    index: Vec<NaiveDate>,
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

impl Frame {
    /// Empty table over `index`.
    pub fn new(index: Vec<NaiveDate>) -> Self {
        Self {
            index,
            columns: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn from_columns(
        index: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, AppError> {
        let mut frame = Self::new(index);
        for (name, values) in columns {
            frame.push_column(name, values)?;
        }
        Ok(frame)
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AppError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(AppError::config(
                "frame",
                format!(
                    "column '{name}' has {} values for an index of {}",
                    values.len(),
                    self.index.len()
                ),
            ));
        }
        if self.columns.contains(&name) {
            return Err(AppError::config("frame", format!("duplicate column '{name}'")));
        }
        self.columns.push(name);
        self.data.push(values);
        Ok(())
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.index.last().copied()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.column_position(name).map(|i| self.data[i].as_slice())
    }

    /// Column by name or a configuration error naming it.
    pub fn require(&self, name: &str) -> Result<&[f64], AppError> {
        self.column(name)
            .ok_or_else(|| AppError::config("columns", format!("missing required column '{name}'")))
    }

    /// Project onto `names`, in that order.
    pub fn select(&self, names: &[String]) -> Result<Frame, AppError> {
        let mut out = Frame::new(self.index.clone());
        for name in names {
            out.push_column(name.clone(), self.require(name)?.to_vec())?;
        }
        Ok(out)
    }

    /// Keep only rows where every column holds a finite value.
    pub fn drop_incomplete_rows(&self) -> Frame {
        let keep: Vec<usize> = (0..self.nrows())
            .filter(|&r| self.data.iter().all(|col| col[r].is_finite()))
            .collect();

        Frame {
            index: keep.iter().map(|&r| self.index[r]).collect(),
            columns: self.columns.clone(),
            data: self
                .data
                .iter()
                .map(|col| keep.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }

    /// Replace a column by its first difference; the first row becomes missing.
    pub fn difference_column(&mut self, name: &str) -> Result<(), AppError> {
        let pos = self
            .column_position(name)
            .ok_or_else(|| AppError::config("columns", format!("missing required column '{name}'")))?;
        let col = &mut self.data[pos];
        for r in (1..col.len()).rev() {
            col[r] -= col[r - 1];
        }
        if let Some(first) = col.first_mut() {
            *first = f64::NAN;
        }
        Ok(())
    }

    /// Drop the final row (used to exclude an incomplete current month).
    pub fn drop_last_row(&mut self) {
        if self.index.pop().is_some() {
            for col in &mut self.data {
                col.pop();
            }
        }
    }

    /// Row-major observation matrix (`nrows × ncols`).
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.nrows(), self.ncols(), |r, c| self.data[c][r])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap())
            .collect()
    }

    #[test]
    fn drop_incomplete_rows_removes_nan_and_inf() {
        let frame = Frame::from_columns(
            months(4),
            vec![
                ("a".to_string(), vec![1.0, f64::NAN, 3.0, 4.0]),
                ("b".to_string(), vec![1.0, 2.0, f64::INFINITY, 4.0]),
            ],
        )
        .unwrap();
        let clean = frame.drop_incomplete_rows();
        assert_eq!(clean.nrows(), 2);
        assert_eq!(clean.column("a").unwrap(), &[1.0, 4.0]);
        assert_eq!(clean.index()[1], months(4)[3]);
    }

    #[test]
    fn difference_column_shifts_in_place() {
        let mut frame =
            Frame::from_columns(months(3), vec![("x".to_string(), vec![1.0, 4.0, 9.0])]).unwrap();
        frame.difference_column("x").unwrap();
        let col = frame.column("x").unwrap();
        assert!(col[0].is_nan());
        assert_eq!(&col[1..], &[3.0, 5.0]);
    }

    #[test]
    fn select_reports_missing_column() {
        let frame = Frame::from_columns(months(2), vec![("x".to_string(), vec![1.0, 2.0])]).unwrap();
        let err = frame.select(&["y".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
