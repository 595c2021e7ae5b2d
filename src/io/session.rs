//! JSON documents on disk: request files and saved sessions.
//!
//! A session holds whole results so `scen show` can re-render them without
//! refitting or resimulating.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ProjectionResult, SimulationResult};
use crate::error::AppError;

/// One saved result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Session {
    Projection(Box<ProjectionResult>),
    Simulation(Box<SimulationResult>),
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to open JSON: {e}")))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::config(path.display().to_string(), format!("invalid JSON: {e}")))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to create JSON: {e}")))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to write JSON: {e}")))
}

pub fn save_session(path: &Path, session: &Session) -> Result<(), AppError> {
    write_json(path, session)?;
    info!(path = %path.display(), "session saved");
    Ok(())
}

pub fn load_session(path: &Path) -> Result<Session, AppError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HistoricalSeries, ScenarioAnchors, SimulationRequest};
    use crate::montecarlo::simulate_legacy;

    #[test]
    fn simulation_session_survives_a_file_round_trip() {
        let req = SimulationRequest {
            history: HistoricalSeries {
                years: vec![2020, 2021, 2022],
                values: vec![1.0, 1.4, 1.1],
            },
            horizon_years: 3,
            num_paths: 10,
            anchors: ScenarioAnchors::default(),
            sector_reference: None,
            advanced: Default::default(),
        };
        let session = Session::Simulation(Box::new(simulate_legacy(&req).unwrap()));

        let path = std::env::temp_dir().join(format!("scen-session-{}.json", std::process::id()));
        save_session(&path, &session).unwrap();
        let back = load_session(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, session);
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = load_session(Path::new("/nonexistent/scen.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
