//! Banxico SIE REST API.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::source::{SeriesSource, http_client, parse_value};
use crate::error::AppError;

const BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1/series";
const PROVIDER: &str = "banxico";

pub struct BanxicoClient {
    client: Client,
    token: String,
}

impl BanxicoClient {
    pub fn new(token: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            token,
        })
    }
}

impl SeriesSource for BanxicoClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn fetch(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        let url = format!(
            "{BASE_URL}/{series_id}/datos/{}/{}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        let resp = self
            .client
            .get(url)
            .header("Bmx-Token", &self.token)
            .send()
            .map_err(|e| AppError::fetch(PROVIDER, series_id, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(
                PROVIDER,
                series_id,
                format!("request failed with status {}", resp.status()),
            ));
        }

        let body: SieResponse = resp
            .json()
            .map_err(|e| AppError::fetch(PROVIDER, series_id, format!("failed to parse response: {e}")))?;

        parse_response(series_id, body)
    }
}

#[derive(Debug, Deserialize)]
struct SieResponse {
    bmx: SieBody,
}

#[derive(Debug, Deserialize)]
struct SieBody {
    series: Vec<SieSeries>,
}

#[derive(Debug, Deserialize)]
struct SieSeries {
    #[serde(default)]
    datos: Vec<SieDatum>,
}

#[derive(Debug, Deserialize)]
struct SieDatum {
    fecha: String,
    dato: String,
}

fn parse_response(series_id: &str, body: SieResponse) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    let series = body
        .bmx
        .series
        .into_iter()
        .next()
        .ok_or_else(|| AppError::fetch(PROVIDER, series_id, "response contains no series"))?;

    series
        .datos
        .into_iter()
        .map(|d| {
            let date = NaiveDate::parse_from_str(&d.fecha, "%d/%m/%Y").map_err(|e| {
                AppError::fetch(PROVIDER, series_id, format!("invalid date '{}': {e}", d.fecha))
            })?;
            Ok((date, parse_value(&d.dato)))
        })
        .collect()
}
