/// Core data types for the TideWatch flood risk service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O, only types, their small accessors and error enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Source labels
// ---------------------------------------------------------------------------

/// Source label recorded on elevations measured by the USGS EPQS service.
pub const USGS_ELEVATION_SOURCE: &str = "USGS National Elevation Dataset";

/// Source label recorded when the elevation lookup failed and the
/// conservative default was substituted. Anything starting with `default`
/// is treated as a fallback by confidence estimation.
pub const ELEVATION_FALLBACK_SOURCE: &str = "default (API unavailable)";

/// Elevation substituted when the USGS lookup fails, in feet. Low enough to
/// bias toward caution for Norfolk's terrain.
pub const ELEVATION_FALLBACK_FT: f64 = 5.0;

// ---------------------------------------------------------------------------
// Tide types
// ---------------------------------------------------------------------------

/// Latest observed water level at a tide station, in feet above MLLW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideReading {
    pub timestamp: DateTime<Utc>,
    pub water_level_ft: f64,
    pub station_id: String,
}

/// One hourly astronomical tide prediction, in feet above MLLW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidePrediction {
    pub timestamp: DateTime<Utc>,
    pub predicted_level_ft: f64,
}

/// Everything the tide gateway knows right now.
///
/// `current` is `None` when the station could not be reached or returned no
/// usable value. That is an expected degraded state, not an error.
/// `predictions` are always in non-decreasing timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideSnapshot {
    pub current: Option<TideReading>,
    pub predictions: Vec<TidePrediction>,
    pub station_name: String,
}

impl TideSnapshot {
    /// Snapshot returned when nothing could be fetched.
    pub fn unavailable(station_name: &str) -> Self {
        Self {
            current: None,
            predictions: Vec::new(),
            station_name: station_name.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Weather types
// ---------------------------------------------------------------------------

/// One NWS forecast period ("Tonight", "Wednesday", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPeriod {
    pub name: String,
    pub temperature: i32,
    pub temperature_unit: String,
    /// Raw descriptor, e.g. "10 to 15 mph".
    pub wind_speed: String,
    /// 16-point compass code, e.g. "NE".
    pub wind_direction: String,
    pub short_forecast: String,
    pub detailed_forecast: String,
    /// Probability of precipitation, percent 0-100.
    pub precipitation_chance: u8,
}

/// Forecast periods plus the scalar fields the risk engine consumes.
///
/// An empty `periods` list is valid and means the forecast could not be
/// fetched; the scalars then sit at their zero defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub periods: Vec<WeatherPeriod>,
    pub precipitation_forecast_in: f64,
    pub wind_speed_mph: f64,
    pub wind_direction: String,
}

// ---------------------------------------------------------------------------
// Elevation types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_ft: f64,
    /// Kept verbatim: distinguishes a measurement from the fallback.
    pub source: String,
}

impl ElevationSnapshot {
    pub fn fallback(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_ft: ELEVATION_FALLBACK_FT,
            source: ELEVATION_FALLBACK_SOURCE.to_string(),
        }
    }

    /// True when the elevation is a substituted default, not a measurement.
    pub fn is_fallback(&self) -> bool {
        self.source.starts_with("default")
    }
}

// ---------------------------------------------------------------------------
// Risk types
// ---------------------------------------------------------------------------

/// Letter grade for a composite score, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskGrade {
    A,
    B,
    C,
    D,
    F,
}

impl RiskGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskGrade::A => "A",
            RiskGrade::B => "B",
            RiskGrade::C => "C",
            RiskGrade::D => "D",
            RiskGrade::F => "F",
        }
    }
}

impl fmt::Display for RiskGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RiskGrade::A),
            "B" => Ok(RiskGrade::B),
            "C" => Ok(RiskGrade::C),
            "D" => Ok(RiskGrade::D),
            "F" => Ok(RiskGrade::F),
            other => Err(format!("unknown risk grade '{}'", other)),
        }
    }
}

/// Factors are reported, and recommendations judged, at this many decimals.
pub const FACTOR_DECIMALS: i32 = 3;

/// The four normalized contributions to the composite score, each in [0,1].
///
/// Values are held at full precision so the score can be recomputed from
/// them exactly; serialization rounds to `FACTOR_DECIMALS`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    #[serde(serialize_with = "serialize_factor")]
    pub tidal: f64,
    #[serde(serialize_with = "serialize_factor")]
    pub elevation: f64,
    #[serde(serialize_with = "serialize_factor")]
    pub precipitation: f64,
    #[serde(serialize_with = "serialize_factor")]
    pub wind_surge: f64,
}

impl RiskFactors {
    /// Copy rounded to `FACTOR_DECIMALS`, as shown to users.
    pub fn rounded(&self) -> Self {
        Self {
            tidal: round_factor(self.tidal),
            elevation: round_factor(self.elevation),
            precipitation: round_factor(self.precipitation),
            wind_surge: round_factor(self.wind_surge),
        }
    }
}

fn round_factor(value: f64) -> f64 {
    let scale = 10f64.powi(FACTOR_DECIMALS);
    (value * scale).round() / scale
}

fn serialize_factor<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_factor(*value))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Composite score 0-100, one decimal place.
    pub score: f64,
    pub grade: RiskGrade,
    pub factors: RiskFactors,
    pub summary: String,
    pub recommendations: Vec<String>,
    /// Data-quality confidence in [0.3, 1.0], two decimal places.
    pub confidence: f64,
}

/// A scored location together with the inputs that produced the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub risk: RiskScore,
    pub tide: TideSnapshot,
    pub weather: WeatherSnapshot,
    pub elevation: ElevationSnapshot,
    pub assessed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// A request to be notified when risk at a location reaches a grade.
/// Keyed by `phone_number`; subscribing again replaces the earlier entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSubscription {
    pub phone_number: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(
        default = "crate::alert::thresholds::default_threshold",
        deserialize_with = "crate::alert::thresholds::deserialize_threshold"
    )]
    pub threshold_grade: RiskGrade,
}

/// Outcome of handing an alert to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent { message_id: String },
    /// No transport configured; the message was logged only.
    Disabled,
    Failed { reason: String },
}

/// Record of one dispatch attempt. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotification {
    pub subscription: AlertSubscription,
    pub risk: RiskScore,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub delivery: DeliveryStatus,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding an upstream source.
/// Always recovered inside a gateway; never reaches the risk engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Non-2xx HTTP response.
    HttpError(u16),
    /// The request did not complete within the client timeout.
    Timeout,
    /// Connection or transport-level failure.
    RequestFailed(String),
    /// The response body could not be decoded.
    ParseError(String),
    /// The response decoded but carried no usable values.
    NoDataAvailable(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::HttpError(code) => write!(f, "HTTP error: {}", code),
            GatewayError::Timeout => write!(f, "Request timeout"),
            GatewayError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            GatewayError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            GatewayError::NoDataAvailable(what) => write!(f, "No data available: {}", what),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if let Some(status) = err.status() {
            GatewayError::HttpError(status.as_u16())
        } else if err.is_decode() {
            GatewayError::ParseError(err.to_string())
        } else {
            GatewayError::RequestFailed(err.to_string())
        }
    }
}

/// Rejected assessment requests. These never reach the risk engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentError {
    OutsideCoverage { latitude: f64, longitude: f64 },
}

impl fmt::Display for AssessmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentError::OutsideCoverage { latitude, longitude } => write!(
                f,
                "Coordinates ({}, {}) must be within the Norfolk, VA area",
                latitude, longitude
            ),
        }
    }
}

impl std::error::Error for AssessmentError {}
