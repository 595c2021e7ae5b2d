//! Command-line parsing for the `scen` scenario engine.
//!
//! Argument parsing and command dispatch stay separate from the econometrics
//! and simulation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::ScenarioOrientation;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "scen", version, about = "Economic scenario engine: VAR/VECM projections and Monte Carlo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch series, fit VAR/VECM, and print base/positive/negative projections.
    Project(ProjectArgs),
    /// Run the mean-reverting Monte Carlo simulator on an annual history.
    Simulate(SimulateArgs),
    /// Re-render a saved session without recomputing it.
    Show(ShowArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ProjectArgs {
    /// Projection request JSON files; identical requests run once.
    #[arg(value_name = "REQUEST", required = true)]
    pub requests: Vec<PathBuf>,

    /// Which interval bound is the favourable scenario (overrides the request).
    #[arg(long, value_enum)]
    pub orientation: Option<ScenarioOrientation>,

    /// Reference date; its month counts as incomplete (default: today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Export the monthly scenarios instead of the annual ones.
    #[arg(long)]
    pub monthly: bool,

    /// Export scenarios to CSV (single request only).
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Save the full result as a session JSON (single request only).
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Simulation request JSON.
    #[arg(value_name = "REQUEST")]
    pub request: PathBuf,

    /// Annual history CSV (`year,value`) replacing the request's history.
    #[arg(long, value_name = "CSV")]
    pub history: Option<PathBuf>,

    /// Use the legacy fixed-speed simulator.
    #[arg(long)]
    pub legacy: bool,

    /// Override the number of paths.
    #[arg(short = 'n', long)]
    pub paths: Option<usize>,

    /// Override the horizon in years.
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Export median paths to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Save the full result as a session JSON.
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Session JSON written by `--save`.
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Export the session's scenarios to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
