//! Reporting utilities: residual diagnostics and formatted terminal output.

pub mod format;
pub mod residuals;

pub use format::{format_bundle, format_projection, format_simulation, format_summary};
pub use residuals::{ACF_LAGS, acf, bartlett_band, residual_diagnostics};
