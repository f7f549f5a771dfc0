/// NOAA CO-OPS Tides & Currents API client
///
/// Retrieves the latest observed water level and hourly astronomical
/// predictions for a tide station. All values are feet above MLLW, times
/// are GMT.
///
/// API Documentation: https://api.tidesandcurrents.noaa.gov/api/prod/

use crate::ingest::{TideSource, check_status};
use crate::model::{GatewayError, TidePrediction, TideReading};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;

/// Timestamp format used in CO-OPS JSON payloads.
const NOAA_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Query window for the latest observation. Observations arrive every six
/// minutes, so an hour always contains several unless the station is down.
const WATER_LEVEL_LOOKBACK_HOURS: i64 = 1;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct WaterLevelResponse {
    #[serde(default)]
    data: Vec<WaterLevelSample>,
    error: Option<NoaaErrorBody>,
}

#[derive(Debug, Deserialize)]
struct WaterLevelSample {
    t: String,
    v: String,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    #[serde(default)]
    predictions: Vec<PredictionSample>,
    error: Option<NoaaErrorBody>,
}

#[derive(Debug, Deserialize)]
struct PredictionSample {
    t: String,
    v: String,
}

#[derive(Debug, Deserialize)]
struct NoaaErrorBody {
    message: String,
}

// ============================================================================
// URL Construction
// ============================================================================

fn format_noaa_date(t: DateTime<Utc>) -> String {
    // CO-OPS wants "yyyyMMdd HH:mm"; the space is percent-encoded.
    t.format("%Y%m%d%%20%H:%M").to_string()
}

fn common_params(station_id: &str) -> String {
    format!(
        "station={}&datum=MLLW&units=english&time_zone=gmt&format=json&application=tidewatch",
        station_id
    )
}

pub fn build_water_level_url(base_url: &str, station_id: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}?product=water_level&begin_date={}&end_date={}&{}",
        base_url,
        format_noaa_date(now - Duration::hours(WATER_LEVEL_LOOKBACK_HOURS)),
        format_noaa_date(now),
        common_params(station_id)
    )
}

pub fn build_predictions_url(base_url: &str, station_id: &str, now: DateTime<Utc>, hours: u32) -> String {
    format!(
        "{}?product=predictions&interval=h&begin_date={}&end_date={}&{}",
        base_url,
        format_noaa_date(now),
        format_noaa_date(now + Duration::hours(i64::from(hours))),
        common_params(station_id)
    )
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_noaa_time(t: &str) -> Result<DateTime<Utc>, GatewayError> {
    NaiveDateTime::parse_from_str(t, NOAA_TIME_FORMAT)
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        .map_err(|e| GatewayError::ParseError(format!("bad timestamp '{}': {}", t, e)))
}

/// Parses a `water_level` response into the most recent reading that
/// carries a value. Blank samples are skipped.
pub fn parse_water_level(body: &str, station_id: &str) -> Result<TideReading, GatewayError> {
    let response: WaterLevelResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::ParseError(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(GatewayError::NoDataAvailable(format!("station {}: {}", station_id, err.message)));
    }

    let latest = response
        .data
        .iter()
        .rev()
        .find(|s| !s.v.trim().is_empty())
        .ok_or_else(|| GatewayError::NoDataAvailable(format!("station {}: no water level samples", station_id)))?;

    let water_level_ft = latest
        .v
        .trim()
        .parse::<f64>()
        .map_err(|e| GatewayError::ParseError(format!("bad water level '{}': {}", latest.v, e)))?;

    Ok(TideReading {
        timestamp: parse_noaa_time(&latest.t)?,
        water_level_ft,
        station_id: station_id.to_string(),
    })
}

/// Parses a `predictions` response, sorted by timestamp.
pub fn parse_predictions(body: &str) -> Result<Vec<TidePrediction>, GatewayError> {
    let response: PredictionsResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::ParseError(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(GatewayError::NoDataAvailable(err.message));
    }

    let mut predictions = response
        .predictions
        .iter()
        .map(|p| {
            let predicted_level_ft = p
                .v
                .trim()
                .parse::<f64>()
                .map_err(|e| GatewayError::ParseError(format!("bad prediction '{}': {}", p.v, e)))?;
            Ok(TidePrediction {
                timestamp: parse_noaa_time(&p.t)?,
                predicted_level_ft,
            })
        })
        .collect::<Result<Vec<_>, GatewayError>>()?;

    predictions.sort_by_key(|p| p.timestamp);
    Ok(predictions)
}

// ============================================================================
// API Client
// ============================================================================

pub struct NoaaClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NoaaClient {
    pub fn new(client: reqwest::blocking::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn get_text(&self, url: &str) -> Result<String, GatewayError> {
        let response = self.client.get(url).send()?;
        Ok(check_status(response)?.text()?)
    }
}

impl TideSource for NoaaClient {
    fn current_water_level(&self, station_id: &str) -> Result<TideReading, GatewayError> {
        let url = build_water_level_url(&self.base_url, station_id, Utc::now());
        parse_water_level(&self.get_text(&url)?, station_id)
    }

    fn predictions(&self, station_id: &str, hours: u32) -> Result<Vec<TidePrediction>, GatewayError> {
        let url = build_predictions_url(&self.base_url, station_id, Utc::now(), hours);
        parse_predictions(&self.get_text(&url)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
