//! From forecast tables to labelled, converged scenario paths.

pub mod bundle;
pub mod convergence;
pub mod reconstruct;

pub use bundle::{annual, bundle, scenarios_from_bounds, summarize};
pub use convergence::{ScenarioConvergenceEngine, converge};
pub use reconstruct::{Reconstruction, reconstruct};
