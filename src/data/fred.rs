//! FRED observations API.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::source::{SeriesSource, http_client, parse_value};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const PROVIDER: &str = "fred";

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }
}

impl SeriesSource for FredClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn fetch(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
            ])
            .send()
            .map_err(|e| AppError::fetch(PROVIDER, series_id, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(
                PROVIDER,
                series_id,
                format!("request failed with status {}", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::fetch(PROVIDER, series_id, format!("failed to parse response: {e}")))?;

        parse_observations(series_id, body)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(
    series_id: &str,
    body: ObservationsResponse,
) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    body.observations
        .into_iter()
        .map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                AppError::fetch(PROVIDER, series_id, format!("invalid date '{}': {e}", obs.date))
            })?;
            Ok((date, parse_value(&obs.value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_marker_becomes_nan() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"observations":[
                {"date":"2024-01-01","value":"308.4"},
                {"date":"2024-02-01","value":"."}
            ]}"#,
        )
        .unwrap();
        let obs = parse_observations("CPIAUCSL", body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].1, 308.4);
        assert!(obs[1].1.is_nan());
    }

    #[test]
    fn malformed_date_names_the_series() {
        let body: ObservationsResponse =
            serde_json::from_str(r#"{"observations":[{"date":"01/2024","value":"1"}]}"#).unwrap();
        let err = parse_observations("DGS10", body).unwrap_err();
        assert!(err.to_string().contains("DGS10"));
    }
}
