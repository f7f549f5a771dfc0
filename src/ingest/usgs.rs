/// USGS Elevation Point Query Service (EPQS) client
///
/// Returns ground elevation in feet for a WGS84 point from the 3DEP
/// National Elevation Dataset.
///
/// API Documentation: https://epqs.nationalmap.gov/v1/docs

use crate::ingest::{ElevationSource, check_status};
use crate::model::GatewayError;
use serde::Deserialize;
use serde_json::Value;

/// EPQS reports points outside its coverage with this sentinel.
const EPQS_NO_DATA_SENTINEL: f64 = -1_000_000.0;

#[derive(Debug, Deserialize)]
struct EpqsResponse {
    value: Option<Value>,
}

pub fn build_elevation_url(base_url: &str, latitude: f64, longitude: f64) -> String {
    format!(
        "{}?x={}&y={}&wkid=4326&units=Feet&includeDate=false",
        base_url, longitude, latitude
    )
}

/// Parses an EPQS body. `value` may be a JSON number or a numeric string.
pub fn parse_elevation(body: &str) -> Result<f64, GatewayError> {
    let response: EpqsResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::ParseError(e.to_string()))?;

    let elevation = match response.value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Null) | None => {
            return Err(GatewayError::NoDataAvailable("EPQS returned no value".to_string()));
        }
        Some(other) => {
            return Err(GatewayError::ParseError(format!("unexpected elevation value {}", other)));
        }
    }
    .ok_or_else(|| GatewayError::ParseError("elevation value is not numeric".to_string()))?;

    if elevation <= EPQS_NO_DATA_SENTINEL {
        return Err(GatewayError::NoDataAvailable("point outside elevation coverage".to_string()));
    }
    Ok(elevation)
}

pub struct UsgsElevationClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl UsgsElevationClient {
    pub fn new(client: reqwest::blocking::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

impl ElevationSource for UsgsElevationClient {
    fn elevation_ft(&self, latitude: f64, longitude: f64) -> Result<f64, GatewayError> {
        let url = build_elevation_url(&self.base_url, latitude, longitude);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()?;
        parse_elevation(&check_status(response)?.text()?)
    }
}
