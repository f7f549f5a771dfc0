//! Data Source Verification Module
//!
//! Probes each configured upstream once, directly and without caching or
//! fallbacks, to show which sources are reachable and returning data.
//!
//! Run this after changing station, grid or endpoint settings.

use crate::config::Settings;
use crate::ingest::noaa::NoaaClient;
use crate::ingest::nws::NwsClient;
use crate::ingest::usgs::UsgsElevationClient;
use crate::ingest::{ElevationSource, GridPoint, TideSource, WeatherSource, http_client};
use crate::locations::SAMPLE_LOCATIONS;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub tide_result: TideVerification,
    pub weather_result: WeatherVerification,
    pub elevation_results: Vec<ElevationVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub checks_total: usize,
    pub checks_working: usize,
    pub checks_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TideVerification {
    pub station_id: String,
    pub name: String,
    pub status: VerificationStatus,
    pub latest_level_ft: Option<f64>,
    pub predictions_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherVerification {
    pub grid: String,
    pub status: VerificationStatus,
    pub periods_count: usize,
    pub peak_wind_mph: f64,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationVerification {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: VerificationStatus,
    pub elevation_ft: Option<f64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl VerificationStatus {
    fn is_working(&self) -> bool {
        !matches!(self, VerificationStatus::Failed)
    }
}

// ============================================================================
// NOAA Verification
// ============================================================================

/// Water level and predictions both present is Success; either one alone
/// is PartialSuccess.
pub fn verify_tide_station(
    source: &dyn TideSource,
    station_id: &str,
    name: &str,
    prediction_hours: u32,
) -> TideVerification {
    let mut result = TideVerification {
        station_id: station_id.to_string(),
        name: name.to_string(),
        status: VerificationStatus::Failed,
        latest_level_ft: None,
        predictions_count: 0,
        error_message: None,
    };
    let mut errors = Vec::new();

    match source.current_water_level(station_id) {
        Ok(reading) => result.latest_level_ft = Some(reading.water_level_ft),
        Err(e) => errors.push(format!("water level: {}", e)),
    }
    match source.predictions(station_id, prediction_hours) {
        Ok(predictions) => result.predictions_count = predictions.len(),
        Err(e) => errors.push(format!("predictions: {}", e)),
    }

    let has_level = result.latest_level_ft.is_some();
    let has_predictions = result.predictions_count > 0;
    result.status = match (has_level, has_predictions) {
        (true, true) => VerificationStatus::Success,
        (false, false) => VerificationStatus::Failed,
        _ => VerificationStatus::PartialSuccess,
    };
    if !errors.is_empty() {
        result.error_message = Some(errors.join("; "));
    }

    result
}

// ============================================================================
// NWS Verification
// ============================================================================

pub fn verify_forecast_grid(source: &dyn WeatherSource, grid: &GridPoint) -> WeatherVerification {
    let mut result = WeatherVerification {
        grid: grid.to_string(),
        status: VerificationStatus::Failed,
        periods_count: 0,
        peak_wind_mph: 0.0,
        error_message: None,
    };

    match source.forecast(grid) {
        Ok(snapshot) => {
            result.periods_count = snapshot.periods.len();
            result.peak_wind_mph = snapshot.wind_speed_mph;
            result.status = if snapshot.periods.is_empty() {
                VerificationStatus::PartialSuccess
            } else {
                VerificationStatus::Success
            };
        }
        Err(e) => {
            result.error_message = Some(format!("API request failed: {}", e));
        }
    }

    result
}

// ============================================================================
// USGS Verification
// ============================================================================

pub fn verify_elevation_point(
    source: &dyn ElevationSource,
    name: &str,
    latitude: f64,
    longitude: f64,
) -> ElevationVerification {
    let mut result = ElevationVerification {
        name: name.to_string(),
        latitude,
        longitude,
        status: VerificationStatus::Failed,
        elevation_ft: None,
        error_message: None,
    };

    match source.elevation_ft(latitude, longitude) {
        Ok(ft) => {
            result.elevation_ft = Some(ft);
            result.status = VerificationStatus::Success;
        }
        Err(e) => {
            result.error_message = Some(format!("API request failed: {}", e));
        }
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn summarize(report: &mut VerificationReport) {
    let statuses = std::iter::once(&report.tide_result.status)
        .chain(std::iter::once(&report.weather_result.status))
        .chain(report.elevation_results.iter().map(|r| &r.status));

    let mut summary = VerificationSummary::default();
    for status in statuses {
        summary.checks_total += 1;
        if status.is_working() {
            summary.checks_working += 1;
        } else {
            summary.checks_failed += 1;
        }
    }
    report.summary = summary;
}

pub fn run_full_verification(settings: &Settings) -> Result<VerificationReport, Box<dyn Error>> {
    let timeout = settings.request_timeout();
    let agent = settings.nws.user_agent.as_str();

    println!("🔍 Verifying NOAA tide station...");
    let noaa = NoaaClient::new(http_client(timeout, agent)?, &settings.noaa.base_url);
    let tide_result = verify_tide_station(
        &noaa,
        &settings.noaa.station_id,
        &settings.noaa.station_name,
        settings.noaa.prediction_hours,
    );
    match tide_result.status {
        VerificationStatus::Success => println!(
            "  {} ... ✓ OK (level {:.2} ft, {} predictions)",
            tide_result.station_id,
            tide_result.latest_level_ft.unwrap_or_default(),
            tide_result.predictions_count
        ),
        VerificationStatus::PartialSuccess => println!(
            "  {} ... ⚠ Partial: {}",
            tide_result.station_id,
            tide_result.error_message.as_deref().unwrap_or("no predictions")
        ),
        VerificationStatus::Failed => println!(
            "  {} ... ✗ FAILED: {}",
            tide_result.station_id,
            tide_result.error_message.as_deref().unwrap_or("Unknown")
        ),
    }

    println!("\n🔍 Verifying NWS forecast grid...");
    let nws = NwsClient::new(http_client(timeout, agent)?, &settings.nws.base_url);
    let weather_result = verify_forecast_grid(&nws, &settings.nws.grid());
    match weather_result.status {
        VerificationStatus::Success => println!(
            "  {} ... ✓ OK ({} periods)",
            weather_result.grid, weather_result.periods_count
        ),
        VerificationStatus::PartialSuccess => println!("  {} ... ⚠ Responsive but no periods", weather_result.grid),
        VerificationStatus::Failed => println!(
            "  {} ... ✗ FAILED: {}",
            weather_result.grid,
            weather_result.error_message.as_deref().unwrap_or("Unknown")
        ),
    }

    println!("\n🔍 Verifying USGS elevation at sample locations...");
    let usgs = UsgsElevationClient::new(http_client(timeout, agent)?, &settings.usgs.elevation_url);
    let mut elevation_results = Vec::new();
    for sample in SAMPLE_LOCATIONS {
        let result = verify_elevation_point(&usgs, sample.name, sample.latitude, sample.longitude);
        match result.elevation_ft {
            Some(ft) => println!("  {} ... ✓ OK ({:.1} ft)", sample.name, ft),
            None => println!(
                "  {} ... ✗ FAILED: {}",
                sample.name,
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
        elevation_results.push(result);
    }

    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        tide_result,
        weather_result,
        elevation_results,
        summary: VerificationSummary::default(),
    };
    summarize(&mut report);
    Ok(report)
}

pub fn print_summary(report: &VerificationReport) {
    let rule = "═".repeat(59);
    println!("\n{}", rule);
    println!("📊 VERIFICATION SUMMARY");
    println!("{}", rule);
    println!();
    println!("NOAA Tide Station:  {:?}", report.tide_result.status);
    println!("NWS Forecast Grid:  {:?}", report.weather_result.status);
    println!(
        "USGS Elevation:     {}/{} points",
        report
            .elevation_results
            .iter()
            .filter(|r| r.status.is_working())
            .count(),
        report.elevation_results.len()
    );
    println!();

    let success_rate = if report.summary.checks_total > 0 {
        (report.summary.checks_working as f64 / report.summary.checks_total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, report.summary.checks_working, report.summary.checks_total
    );
    println!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GatewayError, TidePrediction, TideReading, WeatherSnapshot};
    use chrono::TimeZone;

    struct LevelOnly;

    impl TideSource for LevelOnly {
        fn current_water_level(&self, station_id: &str) -> Result<TideReading, GatewayError> {
            Ok(TideReading {
                timestamp: Utc.with_ymd_and_hms(2024, 10, 3, 13, 18, 0).unwrap(),
                water_level_ft: 3.1,
                station_id: station_id.to_string(),
            })
        }

        fn predictions(&self, _station_id: &str, _hours: u32) -> Result<Vec<TidePrediction>, GatewayError> {
            Err(GatewayError::HttpError(500))
        }
    }

    struct Down;

    impl TideSource for Down {
        fn current_water_level(&self, _station_id: &str) -> Result<TideReading, GatewayError> {
            Err(GatewayError::Timeout)
        }

        fn predictions(&self, _station_id: &str, _hours: u32) -> Result<Vec<TidePrediction>, GatewayError> {
            Err(GatewayError::Timeout)
        }
    }

    impl WeatherSource for Down {
        fn forecast(&self, _grid: &GridPoint) -> Result<WeatherSnapshot, GatewayError> {
            Err(GatewayError::HttpError(403))
        }
    }

    impl ElevationSource for Down {
        fn elevation_ft(&self, _lat: f64, _lon: f64) -> Result<f64, GatewayError> {
            Err(GatewayError::NoDataAvailable("outside coverage".to_string()))
        }
    }

    fn grid() -> GridPoint {
        GridPoint {
            office: "AKQ".to_string(),
            x: 89,
            y: 76,
        }
    }

    #[test]
    fn test_tide_without_predictions_is_partial() {
        let result = verify_tide_station(&LevelOnly, "8638610", "Sewells Point, VA", 48);
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.latest_level_ft, Some(3.1));
        let msg = result.error_message.expect("prediction error recorded");
        assert!(msg.contains("predictions"), "message: {}", msg);
    }

    #[test]
    fn test_unreachable_sources_fail() {
        assert_eq!(
            verify_tide_station(&Down, "8638610", "Sewells Point, VA", 48).status,
            VerificationStatus::Failed
        );
        let weather = verify_forecast_grid(&Down, &grid());
        assert_eq!(weather.status, VerificationStatus::Failed);
        assert_eq!(weather.grid, "AKQ/89,76");
        let elev = verify_elevation_point(&Down, "Ghent", 36.8695, -76.2960);
        assert_eq!(elev.status, VerificationStatus::Failed);
        assert!(elev.elevation_ft.is_none());
    }

    #[test]
    fn test_summary_counts_partial_as_working() {
        let mut report = VerificationReport {
            timestamp: String::new(),
            tide_result: verify_tide_station(&LevelOnly, "8638610", "Sewells Point, VA", 48),
            weather_result: verify_forecast_grid(&Down, &grid()),
            elevation_results: vec![verify_elevation_point(&Down, "Ghent", 36.8695, -76.2960)],
            summary: VerificationSummary::default(),
        };
        summarize(&mut report);
        assert_eq!(
            report.summary,
            VerificationSummary {
                checks_total: 3,
                checks_working: 1,
                checks_failed: 2,
            }
        );
    }

    #[test]
    fn test_report_serializes_status_names() {
        let result = verify_elevation_point(&Down, "Ghent", 36.8695, -76.2960);
        let json = serde_json::to_value(&result).expect("serializable");
        assert_eq!(json["status"], "Failed");
    }
}
