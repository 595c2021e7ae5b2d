//! Domain types used throughout both engines.
//!
//! This module defines:
//!
//! - the aligned monthly table (`Frame`)
//! - projection requests and results (`VariableSpec`, `ModelSpec`, `ProjectionResult`)
//! - scenario anchors and bundles (`ScenarioParams`, `ScenarioBundle`)
//! - Monte Carlo requests and results (`SimulationRequest`, `SimulationResult`)

pub mod frame;
pub mod scenario;
pub mod simulation;
pub mod types;

pub use frame::Frame;
pub use scenario::*;
pub use simulation::*;
pub use types::*;
