//! Provider-neutral series fetching.
//!
//! Adapters implement [`SeriesSource`]; the pipeline only sees date/value
//! pairs. Missing provider values arrive as `NaN` and are forward-filled later.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::{debug, info};

use super::banxico::BanxicoClient;
use super::fred::FredClient;
use crate::domain::SeriesDefinition;
use crate::error::AppError;

/// Requests fail fast; there is no retry.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Length of a Banxico SIE token; a token of this length selects Banxico.
pub const BANXICO_TOKEN_LEN: usize = 64;

/// One fetched raw series, in provider order, at native frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub name: String,
    pub observations: Vec<(NaiveDate, f64)>,
}

pub trait SeriesSource {
    fn provider(&self) -> &'static str;

    /// Observations for `series_id` between `start` and `end` inclusive.
    fn fetch(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Banxico,
    Fred,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub fred_api_key: Option<String>,
    pub banxico_token: Option<String>,
}

impl Credentials {
    /// Read `FRED_API_KEY` and `BANXICO_TOKEN`, loading `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            fred_api_key: read("FRED_API_KEY"),
            banxico_token: read("BANXICO_TOKEN"),
        }
    }

    pub fn provider(&self) -> Provider {
        match &self.banxico_token {
            Some(token) if token.len() == BANXICO_TOKEN_LEN => Provider::Banxico,
            _ => Provider::Fred,
        }
    }

    /// Build the adapter for the selected provider.
    pub fn source(&self) -> Result<Box<dyn SeriesSource>, AppError> {
        match self.provider() {
            Provider::Banxico => {
                let token = self.banxico_token.clone().unwrap_or_default();
                Ok(Box::new(BanxicoClient::new(token)?))
            }
            Provider::Fred => {
                let key = self.fred_api_key.clone().ok_or_else(|| {
                    AppError::config("credentials", "missing FRED_API_KEY and no valid BANXICO_TOKEN")
                })?;
                Ok(Box::new(FredClient::new(key)?))
            }
        }
    }
}

pub(crate) fn http_client() -> Result<Client, AppError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::config("http", format!("failed to build HTTP client: {e}")))
}

/// Fetch every definition, one remote call each; the first failure aborts.
pub fn fetch_all(
    source: &dyn SeriesSource,
    definitions: &[SeriesDefinition],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<RawSeries>, AppError> {
    let mut out = Vec::with_capacity(definitions.len());
    for def in definitions {
        let observations = source.fetch(&def.id, start, end)?;
        if observations.is_empty() {
            return Err(AppError::fetch(source.provider(), &def.id, "empty result set"));
        }
        debug!(series = %def.name, id = %def.id, n = observations.len(), "fetched series");
        out.push(RawSeries {
            name: def.name.clone(),
            observations,
        });
    }
    info!(provider = source.provider(), series = out.len(), "raw series fetched");
    Ok(out)
}

/// Parse a provider numeric string; non-numeric markers become `NaN`.
pub(crate) fn parse_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_length_selects_provider() {
        let fred = Credentials {
            fred_api_key: Some("k".into()),
            banxico_token: Some("short".into()),
        };
        assert_eq!(fred.provider(), Provider::Fred);

        let banxico = Credentials {
            fred_api_key: None,
            banxico_token: Some("a".repeat(64)),
        };
        assert_eq!(banxico.provider(), Provider::Banxico);
    }

    #[test]
    fn missing_fred_key_is_a_configuration_error() {
        let creds = Credentials::default();
        let err = creds.source().err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn provider_markers_parse_as_missing() {
        assert!(parse_value(".").is_nan());
        assert!(parse_value("N/E").is_nan());
        assert_eq!(parse_value(" 4.25 "), 4.25);
    }

    struct Canned;

    impl SeriesSource for Canned {
        fn provider(&self) -> &'static str {
            "canned"
        }

        fn fetch(&self, series_id: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<(NaiveDate, f64)>, AppError> {
            if series_id == "EMPTY" {
                return Ok(Vec::new());
            }
            Ok(vec![(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1.0)])
        }
    }

    #[test]
    fn empty_result_set_is_a_fetch_error_naming_the_series() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let defs = vec![
            SeriesDefinition { name: "a".into(), id: "OK".into() },
            SeriesDefinition { name: "b".into(), id: "EMPTY".into() },
        ];
        match fetch_all(&Canned, &defs, d, d) {
            Err(AppError::DataFetch { series, provider, .. }) => {
                assert_eq!(series, "EMPTY");
                assert_eq!(provider, "canned");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
