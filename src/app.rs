//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module is the real main:
//! - parses CLI arguments
//! - loads request/history/session files
//! - runs the projection pipeline or a simulator
//! - prints reports
//! - writes optional exports and sessions

use chrono::Local;
use clap::Parser;

use crate::cache::{Fingerprint, ResultCache};
use crate::cli::{Cli, Command, ProjectArgs, ShowArgs, SimulateArgs};
use crate::data::Credentials;
use crate::domain::{ProjectionRequest, ProjectionResult, SimulationRequest};
use crate::error::AppError;
use crate::io::{Session, load_history, load_session, read_json, save_session, write_scenarios_csv};
use crate::montecarlo::{simulate, simulate_legacy};
use crate::report::{format_projection, format_simulation};
use crate::series::month_start;

pub mod pipeline;

/// Entry point for the `scen` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Project(args) => handle_project(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_project(args: ProjectArgs) -> Result<(), AppError> {
    if args.requests.len() > 1 && (args.export.is_some() || args.save.is_some()) {
        return Err(AppError::config("cli", "--export and --save take a single request"));
    }
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let credentials = Credentials::from_env();
    let mut cache: ResultCache<ProjectionResult> = ResultCache::new();

    for path in &args.requests {
        let mut request: ProjectionRequest = read_json(path)?;
        if let Some(orientation) = args.orientation {
            request.orientation = orientation;
        }
        // Only the month of `as_of` changes which observations are used.
        let key = Fingerprint::of(&(&request, month_start(as_of)))?;
        let result = cache.get_or_try_insert(key, || pipeline::project(&request, &credentials, as_of))?;

        println!("{}", format_projection(&result));

        if let Some(out) = &args.export {
            if args.monthly {
                write_scenarios_csv(out, &result.monthly)?;
            } else {
                write_scenarios_csv(out, &result.annual)?;
            }
        }
        if let Some(out) = &args.save {
            save_session(out, &Session::Projection(Box::new(result)))?;
        }
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let mut request: SimulationRequest = read_json(&args.request)?;
    if let Some(path) = &args.history {
        request.history = load_history(path)?;
    }
    if let Some(n) = args.paths {
        request.num_paths = n;
    }
    if let Some(h) = args.horizon {
        request.horizon_years = h;
    }

    let result = if args.legacy {
        simulate_legacy(&request)?
    } else {
        simulate(&request)?
    };

    println!("{}", format_simulation(&result));

    if let Some(out) = &args.export {
        write_scenarios_csv(out, &result.bundle)?;
    }
    if let Some(out) = &args.save {
        save_session(out, &Session::Simulation(Box::new(result)))?;
    }
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    match load_session(&args.session)? {
        Session::Projection(result) => {
            println!("{}", format_projection(&result));
            if let Some(out) = &args.export {
                write_scenarios_csv(out, &result.annual)?;
            }
        }
        Session::Simulation(result) => {
            println!("{}", format_simulation(&result));
            if let Some(out) = &args.export {
                write_scenarios_csv(out, &result.bundle)?;
            }
        }
    }
    Ok(())
}
