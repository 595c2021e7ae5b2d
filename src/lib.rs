//! `macro-scenarios` library crate.
//!
//! Two engines over shared domain records:
//!
//! - econometric projection: fetch macro series, pick VAR or VECM, forecast
//!   with intervals and shape base/positive/negative scenarios
//! - Monte Carlo: mean-reverting annual paths in enhanced and legacy variants
//!
//! The binary (`scen`) is a thin wrapper around this library so the core logic
//! is testable without spawning processes.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod domain;
pub mod econometrics;
pub mod error;
pub mod io;
pub mod math;
pub mod montecarlo;
pub mod report;
pub mod scenario;
pub mod series;
