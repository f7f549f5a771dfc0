/// Upstream data ingestion.
///
/// Each remote source sits behind a small trait so gateways and tests can
/// swap the HTTP client for a fake. Clients return `GatewayError` on any
/// failure; `gateway` turns those into cached values or safe fallbacks.
///
/// Submodules:
/// - `cache`   — bounded-age, single-flight cache shared by all gateways.
/// - `noaa`    — NOAA CO-OPS water level and tide predictions.
/// - `nws`     — NWS gridpoint forecast.
/// - `usgs`    — USGS EPQS point elevation.
/// - `gateway` — cached, fallback-on-failure wrappers used by the assessor.

pub mod cache;
pub mod gateway;
pub mod noaa;
pub mod nws;
pub mod usgs;

#[cfg(test)]
pub mod fixtures;

use crate::model::{GatewayError, TidePrediction, TideReading, WeatherSnapshot};
use std::fmt;
use std::time::Duration;

/// NWS forecast grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub office: String,
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{},{}", self.office, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Source traits
// ---------------------------------------------------------------------------

pub trait TideSource: Send + Sync {
    /// Latest observed water level at the station.
    fn current_water_level(&self, station_id: &str) -> Result<TideReading, GatewayError>;

    /// Hourly predictions from now for `hours` hours, ordered by time.
    fn predictions(&self, station_id: &str, hours: u32) -> Result<Vec<TidePrediction>, GatewayError>;
}

pub trait WeatherSource: Send + Sync {
    fn forecast(&self, grid: &GridPoint) -> Result<WeatherSnapshot, GatewayError>;
}

pub trait ElevationSource: Send + Sync {
    /// Ground elevation in feet at a WGS84 point.
    fn elevation_ft(&self, latitude: f64, longitude: f64) -> Result<f64, GatewayError>;
}

/// Blocking HTTP client shared by the upstream clients. The timeout bounds
/// every request so one slow upstream cannot stall an assessment.
pub fn http_client(timeout: Duration, user_agent: &str) -> Result<reqwest::blocking::Client, GatewayError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| GatewayError::RequestFailed(format!("failed to build HTTP client: {}", e)))
}

/// Rejects non-2xx responses before the body is decoded.
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::HttpError(status.as_u16()))
    }
}
