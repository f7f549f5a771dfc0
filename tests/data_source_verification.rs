//! Data Source Verification Integration Tests
//!
//! These tests hit the live NOAA, NWS and USGS APIs to confirm the
//! configured station, forecast grid and sample points return data. They
//! need network access and are ignored by default.
//!
//! Run with: cargo test --test data_source_verification -- --ignored --nocapture

use tidewatch_service::config::Settings;
use tidewatch_service::ingest::noaa::NoaaClient;
use tidewatch_service::ingest::nws::NwsClient;
use tidewatch_service::ingest::usgs::UsgsElevationClient;
use tidewatch_service::ingest::{TideSource, http_client};
use tidewatch_service::locations::SAMPLE_LOCATIONS;
use tidewatch_service::verify::*;

fn client(settings: &Settings) -> reqwest::blocking::Client {
    http_client(std::time::Duration::from_secs(30), &settings.nws.user_agent).unwrap()
}

#[test]
#[ignore]
fn test_noaa_station_verification() {
    let settings = Settings::default();
    let noaa = NoaaClient::new(client(&settings), &settings.noaa.base_url);

    let result = verify_tide_station(
        &noaa,
        &settings.noaa.station_id,
        &settings.noaa.station_name,
        settings.noaa.prediction_hours,
    );

    println!("\n🔍 Testing NOAA Tide Station:");
    println!("═══════════════════════════════════════════════════════════");
    println!("{} ({})", result.name, result.station_id);
    println!("  Status: {:?}", result.status);
    println!("  Latest Level: {:?} ft MLLW", result.latest_level_ft);
    println!("  Predictions: {}", result.predictions_count);
    if let Some(error) = &result.error_message {
        println!("  Error: {}", error);
    }

    assert_ne!(result.status, VerificationStatus::Failed, "Sewells Point is not responding");
}

#[test]
#[ignore]
fn test_noaa_predictions_are_hourly_and_ordered() {
    let settings = Settings::default();
    let noaa = NoaaClient::new(client(&settings), &settings.noaa.base_url);

    let predictions = noaa
        .predictions(&settings.noaa.station_id, 24)
        .expect("prediction request should succeed");

    assert!(predictions.len() >= 24, "expected hourly predictions, got {}", predictions.len());
    assert!(
        predictions.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "predictions must be ordered by time"
    );
}

#[test]
#[ignore]
fn test_nws_grid_verification() {
    let settings = Settings::default();
    let nws = NwsClient::new(client(&settings), &settings.nws.base_url);

    let result = verify_forecast_grid(&nws, &settings.nws.grid());

    println!("\n🔍 Testing NWS Forecast Grid:");
    println!("═══════════════════════════════════════════════════════════");
    println!("{}", result.grid);
    println!("  Status: {:?}", result.status);
    println!("  Periods: {}", result.periods_count);
    println!("  Peak Wind: {} mph", result.peak_wind_mph);
    if let Some(error) = &result.error_message {
        println!("  Error: {}", error);
    }

    assert_eq!(result.status, VerificationStatus::Success, "AKQ/89,76 returned no forecast");
}

#[test]
#[ignore]
fn test_usgs_elevation_verification() {
    let settings = Settings::default();
    let usgs = UsgsElevationClient::new(client(&settings), &settings.usgs.elevation_url);

    println!("\n🔍 Testing USGS Elevation at Sample Locations:");
    println!("═══════════════════════════════════════════════════════════");

    let mut working = 0;
    for sample in SAMPLE_LOCATIONS {
        let result = verify_elevation_point(&usgs, sample.name, sample.latitude, sample.longitude);
        println!("{}: {:?} {:?}", sample.name, result.status, result.elevation_ft);
        if let Some(ft) = result.elevation_ft {
            assert!(
                (-20.0..100.0).contains(&ft),
                "{} elevation {} ft is implausible for Norfolk",
                sample.name,
                ft
            );
            working += 1;
        }
    }

    assert!(working > 0, "No USGS elevation lookups are working!");
}

#[test]
#[ignore]
fn test_full_verification_report() {
    let settings = Settings::default();
    let report = run_full_verification(&settings).expect("verification should run");
    print_summary(&report);

    assert_eq!(report.summary.checks_total, 2 + SAMPLE_LOCATIONS.len());
    assert!(report.summary.checks_working > 0);
}
