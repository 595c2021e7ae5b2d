//! Stationarity screening and cointegration rank.

use tracing::{info, warn};

use super::johansen::CointegrationRankTest;
use super::stationarity::UnitRootTest;
use crate::domain::{Frame, StationarityOutcome, TraceRow, VariableSpec};
use crate::error::AppError;

/// Screening outcome for the modeled variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// One entry per tested variable (rate-of-change variables are skipped).
    pub stationarity: Vec<StationarityOutcome>,
    pub non_stationary: Vec<String>,
    pub cointegration_rank: usize,
    pub trace: Vec<TraceRow>,
}

pub struct StationarityCointegrationAnalyzer<'a> {
    unit_root: &'a dyn UnitRootTest,
    rank_test: &'a dyn CointegrationRankTest,
}

impl<'a> StationarityCointegrationAnalyzer<'a> {
    pub fn new(unit_root: &'a dyn UnitRootTest, rank_test: &'a dyn CointegrationRankTest) -> Self {
        Self { unit_root, rank_test }
    }

    pub fn test_stationarity(&self, name: &str, series: &[f64]) -> Result<StationarityOutcome, AppError> {
        let res = self.unit_root.test(series).map_err(|e| match e {
            AppError::Estimation { message, .. } => AppError::estimation(format!("adf '{name}'"), message),
            other => other,
        })?;
        info!(
            variable = name,
            p_value = res.p_value,
            non_stationary = res.non_stationary(),
            "adf test"
        );
        Ok(StationarityOutcome {
            variable: name.to_string(),
            statistic: res.statistic,
            p_value: res.p_value,
            used_lag: res.used_lag,
            non_stationary: res.non_stationary(),
        })
    }

    /// Rank over the non-stationary columns; zero without running the test
    /// when fewer than two are given.
    pub fn test_cointegration(
        &self,
        frame: &Frame,
        non_stationary: &[String],
    ) -> Result<(usize, Vec<TraceRow>), AppError> {
        if non_stationary.len() < 2 {
            return Ok((0, Vec::new()));
        }
        let levels = frame.select(non_stationary)?.to_matrix();
        let res = self.rank_test.trace_test(&levels)?;
        let rank = res.rank();
        let rows = (0..res.trace.len())
            .map(|r| TraceRow {
                r,
                eigenvalue: res.eigenvalues.get(r).copied().unwrap_or(f64::NAN),
                statistic: res.trace[r],
                critical_95: res.critical_95[r],
            })
            .collect();
        info!(rank, variables = non_stationary.len(), "johansen trace test");
        Ok((rank, rows))
    }

    /// Test every variable in `frame` except rate-of-change ones, then the rank.
    pub fn analyze(&self, frame: &Frame, specs: &[VariableSpec]) -> Result<Analysis, AppError> {
        let mut stationarity = Vec::new();
        for name in frame.columns() {
            let is_rate = specs
                .iter()
                .find(|s| &s.name == name)
                .is_some_and(|s| s.transform.is_rate_of_change());
            if is_rate {
                info!(variable = %name, "rate-of-change variable excluded from unit-root testing");
                continue;
            }
            stationarity.push(self.test_stationarity(name, frame.require(name)?)?);
        }

        let non_stationary: Vec<String> = stationarity
            .iter()
            .filter(|o| o.non_stationary)
            .map(|o| o.variable.clone())
            .collect();
        if non_stationary.is_empty() {
            warn!("no non-stationary variables detected; fitting in levels");
        }

        let (cointegration_rank, trace) = self.test_cointegration(frame, &non_stationary)?;
        Ok(Analysis {
            stationarity,
            non_stationary,
            cointegration_rank,
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::NaiveDate;
    use nalgebra::DMatrix;

    use super::*;
    use crate::domain::Transform;
    use crate::econometrics::johansen::JohansenResult;
    use crate::econometrics::stationarity::AdfResult;

    /// Canned p-values by first value of the series.
    struct FixedP(Vec<(f64, f64)>);

    impl UnitRootTest for FixedP {
        fn test(&self, series: &[f64]) -> Result<AdfResult, AppError> {
            let p = self
                .0
                .iter()
                .find(|(key, _)| *key == series[0])
                .map(|(_, p)| *p)
                .unwrap_or(0.5);
            Ok(AdfResult {
                statistic: -1.0,
                p_value: p,
                used_lag: 0,
                nobs: series.len(),
            })
        }
    }

    #[derive(Default)]
    struct CountingRank {
        calls: Cell<usize>,
    }

    impl CointegrationRankTest for CountingRank {
        fn trace_test(&self, levels: &DMatrix<f64>) -> Result<JohansenResult, AppError> {
            self.calls.set(self.calls.get() + 1);
            let k = levels.ncols();
            Ok(JohansenResult {
                eigenvalues: vec![0.2; k],
                trace: vec![100.0; k],
                critical_95: vec![1.0; k],
            })
        }
    }

    fn frame(cols: &[(&str, f64)]) -> Frame {
        let index = (1..=6).map(|m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap()).collect();
        Frame::from_columns(
            index,
            cols.iter()
                .map(|(n, first)| (n.to_string(), (0..6).map(|i| first + i as f64).collect()))
                .collect(),
        )
        .unwrap()
    }

    fn level(name: &str) -> VariableSpec {
        VariableSpec {
            name: name.into(),
            transform: Transform::Level { source_col: name.into() },
        }
    }

    #[test]
    fn single_non_stationary_variable_skips_rank_test() {
        let unit = FixedP(vec![(1.0, 0.2), (100.0, 0.0499)]);
        let rank = CountingRank::default();
        let analyzer = StationarityCointegrationAnalyzer::new(&unit, &rank);
        let f = frame(&[("a", 1.0), ("b", 100.0)]);
        let res = analyzer.analyze(&f, &[level("a"), level("b")]).unwrap();
        assert_eq!(res.non_stationary, vec!["a"]);
        assert_eq!(res.cointegration_rank, 0);
        assert_eq!(rank.calls.get(), 0);
    }

    #[test]
    fn two_non_stationary_variables_run_rank_test() {
        let unit = FixedP(vec![(1.0, 0.05), (100.0, 0.3)]);
        let rank = CountingRank::default();
        let analyzer = StationarityCointegrationAnalyzer::new(&unit, &rank);
        let f = frame(&[("a", 1.0), ("b", 100.0)]);
        let res = analyzer.analyze(&f, &[level("a"), level("b")]).unwrap();
        assert_eq!(rank.calls.get(), 1);
        assert_eq!(res.cointegration_rank, 2);
        assert_eq!(res.trace.len(), 2);
    }

    #[test]
    fn rate_of_change_variable_is_never_tested() {
        let unit = FixedP(vec![]);
        let rank = CountingRank::default();
        let analyzer = StationarityCointegrationAnalyzer::new(&unit, &rank);
        let f = frame(&[("inflation", 1.0), ("rate", 100.0)]);
        let specs = vec![
            VariableSpec {
                name: "inflation".into(),
                transform: Transform::YoyPctChange { source_col: "cpi".into() },
            },
            level("rate"),
        ];
        let res = analyzer.analyze(&f, &specs).unwrap();
        assert_eq!(res.stationarity.len(), 1);
        assert_eq!(res.stationarity[0].variable, "rate");
        assert_eq!(rank.calls.get(), 0);
    }
}
