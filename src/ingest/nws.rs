/// National Weather Service gridpoint forecast client
///
/// Fetches the 12-hour-period forecast for a fixed grid cell and reduces
/// it to the scalar signals the risk engine consumes: an estimated rainfall
/// amount, the peak wind speed and that wind's direction.
///
/// API Documentation: https://www.weather.gov/documentation/services-web-api

use crate::ingest::{GridPoint, WeatherSource, check_status};
use crate::model::{GatewayError, WeatherPeriod, WeatherSnapshot};
use serde::Deserialize;

/// Only the next three days (six 12-hour periods) matter for flooding.
pub const FORECAST_PERIODS_USED: usize = 6;

/// Rainfall estimate (inches) by minimum peak probability of precipitation.
/// NWS periods carry a probability but no amount; this is a rough mapping.
static PRECIP_ESTIMATE_IN: &[(u8, f64)] = &[(80, 1.5), (60, 1.0), (40, 0.5), (20, 0.2)];

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<NwsPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPeriod {
    #[serde(default)]
    name: String,
    #[serde(default)]
    temperature: i32,
    #[serde(default = "default_temperature_unit")]
    temperature_unit: String,
    #[serde(default)]
    wind_speed: String,
    #[serde(default)]
    wind_direction: String,
    #[serde(default)]
    short_forecast: String,
    #[serde(default)]
    detailed_forecast: String,
    probability_of_precipitation: Option<QuantitativeValue>,
}

#[derive(Debug, Deserialize)]
struct QuantitativeValue {
    value: Option<f64>,
}

fn default_temperature_unit() -> String {
    "F".to_string()
}

// ============================================================================
// URL Construction
// ============================================================================

pub fn build_forecast_url(base_url: &str, grid: &GridPoint) -> String {
    format!(
        "{}/gridpoints/{}/{},{}/forecast",
        base_url.trim_end_matches('/'),
        grid.office,
        grid.x,
        grid.y
    )
}

// ============================================================================
// Parsing
// ============================================================================

/// Largest whole number in a descriptor like "10 to 20 mph"; 0 if none.
pub fn parse_wind_speed(descriptor: &str) -> f64 {
    descriptor
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .map(f64::from)
        .unwrap_or(0.0)
}

pub fn estimate_precip_inches(peak_chance: u8) -> f64 {
    PRECIP_ESTIMATE_IN
        .iter()
        .find(|(min_chance, _)| peak_chance >= *min_chance)
        .map(|(_, inches)| *inches)
        .unwrap_or(0.0)
}

fn precip_chance(p: &NwsPeriod) -> u8 {
    p.probability_of_precipitation
        .as_ref()
        .and_then(|q| q.value)
        .map(|v| v.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(0)
}

/// Builds a snapshot from already-decoded periods. The peak wind direction
/// comes from the first period reaching the peak speed.
pub fn summarize_periods(periods: Vec<WeatherPeriod>) -> WeatherSnapshot {
    let mut max_precip = 0u8;
    let mut max_wind = 0.0f64;
    let mut wind_direction = String::new();

    for p in &periods {
        max_precip = max_precip.max(p.precipitation_chance);
        let wind = parse_wind_speed(&p.wind_speed);
        if wind > max_wind {
            max_wind = wind;
            wind_direction = p.wind_direction.clone();
        }
    }

    WeatherSnapshot {
        precipitation_forecast_in: estimate_precip_inches(max_precip),
        wind_speed_mph: max_wind,
        wind_direction,
        periods,
    }
}

pub fn parse_forecast(body: &str) -> Result<WeatherSnapshot, GatewayError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::ParseError(e.to_string()))?;

    let periods: Vec<WeatherPeriod> = response
        .properties
        .periods
        .into_iter()
        .take(FORECAST_PERIODS_USED)
        .map(|p| {
            let precipitation_chance = precip_chance(&p);
            WeatherPeriod {
                name: p.name,
                temperature: p.temperature,
                temperature_unit: p.temperature_unit,
                wind_speed: p.wind_speed,
                wind_direction: p.wind_direction,
                short_forecast: p.short_forecast,
                detailed_forecast: p.detailed_forecast,
                precipitation_chance,
            }
        })
        .collect();

    if periods.is_empty() {
        return Err(GatewayError::NoDataAvailable("forecast has no periods".to_string()));
    }

    Ok(summarize_periods(periods))
}

// ============================================================================
// API Client
// ============================================================================

pub struct NwsClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NwsClient {
    /// `client` must carry an identifying User-Agent; NWS returns 403
    /// without one.
    pub fn new(client: reqwest::blocking::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

impl WeatherSource for NwsClient {
    fn forecast(&self, grid: &GridPoint) -> Result<WeatherSnapshot, GatewayError> {
        let url = build_forecast_url(&self.base_url, grid);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/geo+json")
            .send()?;
        let body = check_status(response)?.text()?;
        parse_forecast(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================
