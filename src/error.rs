//! Error taxonomy shared by both engines.
//!
//! Every failure aborts the current run. Variants carry enough context (series,
//! provider, stage) for a caller to act on the message without a backtrace.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Missing/invalid credentials, missing source column, malformed spec.
    #[error("configuration error ({context}): {message}")]
    Configuration { context: String, message: String },

    /// Network/provider failure or an empty result set.
    #[error("data fetch error [{provider}] series '{series}': {message}")]
    DataFetch {
        provider: String,
        series: String,
        message: String,
    },

    /// Statistical test or model-fit failure.
    #[error("estimation error during {stage}: {message}")]
    Estimation { stage: String, message: String },

    /// Forecast generation failure on a fitted model.
    #[error("forecast error: {message}")]
    Forecast { message: String },
}

impl AppError {
    pub fn config(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn fetch(
        provider: impl Into<String>,
        series: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DataFetch {
            provider: provider.into(),
            series: series.into(),
            message: message.into(),
        }
    }

    pub fn estimation(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Estimation {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn forecast(message: impl Into<String>) -> Self {
        Self::Forecast {
            message: message.into(),
        }
    }

    /// Process exit code used by the `scen` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Configuration { .. } => 2,
            AppError::Estimation { .. } => 3,
            AppError::DataFetch { .. } => 4,
            AppError::Forecast { .. } => 5,
        }
    }
}
