//! Location assessment: coverage check, concurrent gather, scoring.

use crate::analysis::risk::{ScoringParams, calculate_risk_with};
use crate::config::Settings;
use crate::ingest::gateway::{ElevationGateway, Gateways, TideGateway, WeatherGateway};
use crate::locations::CoverageArea;
use crate::logging::{self, DataSource};
use crate::model::{
    AssessmentError, ElevationSnapshot, GatewayError, RiskAssessment, TideSnapshot, WeatherSnapshot,
};
use chrono::Utc;
use std::thread;

pub struct Assessor {
    tide: TideGateway,
    weather: WeatherGateway,
    elevation: ElevationGateway,
    coverage: CoverageArea,
    params: ScoringParams,
}

impl Assessor {
    pub fn new(
        tide: TideGateway,
        weather: WeatherGateway,
        elevation: ElevationGateway,
        coverage: CoverageArea,
        params: ScoringParams,
    ) -> Self {
        Self {
            tide,
            weather,
            elevation,
            coverage,
            params,
        }
    }

    /// Assessor wired to the live upstream APIs.
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        let gateways = Gateways::from_settings(settings)?;
        Ok(Self::new(
            gateways.tide,
            gateways.weather,
            gateways.elevation,
            settings.coverage,
            settings.scoring,
        ))
    }

    pub fn tide(&self) -> &TideGateway {
        &self.tide
    }

    pub fn weather(&self) -> &WeatherGateway {
        &self.weather
    }

    pub fn elevation(&self) -> &ElevationGateway {
        &self.elevation
    }

    pub fn coverage(&self) -> &CoverageArea {
        &self.coverage
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Fetches the three snapshots in parallel. Gateways never fail, and a
    /// worker that panics is replaced by that source's fallback value.
    pub fn gather(&self, latitude: f64, longitude: f64) -> (TideSnapshot, WeatherSnapshot, ElevationSnapshot) {
        thread::scope(|s| {
            let tide = s.spawn(|| self.tide.snapshot());
            let weather = s.spawn(|| self.weather.forecast());
            let elevation = s.spawn(|| self.elevation.elevation_at(latitude, longitude));

            let tide = tide.join().unwrap_or_else(|_| {
                logging::error(DataSource::Noaa, None, "Tide worker panicked; using empty snapshot");
                self.tide.unavailable()
            });
            let weather = weather.join().unwrap_or_else(|_| {
                logging::error(DataSource::Nws, None, "Weather worker panicked; using empty snapshot");
                WeatherSnapshot::default()
            });
            let elevation = elevation.join().unwrap_or_else(|_| {
                logging::error(DataSource::Usgs, None, "Elevation worker panicked; using default");
                ElevationSnapshot::fallback(latitude, longitude)
            });

            (tide, weather, elevation)
        })
    }

    /// Scores a point. Points outside the coverage area are rejected before
    /// any upstream call is made.
    pub fn assess(&self, address: &str, latitude: f64, longitude: f64) -> Result<RiskAssessment, AssessmentError> {
        if !self.coverage.contains(latitude, longitude) {
            return Err(AssessmentError::OutsideCoverage { latitude, longitude });
        }

        let (tide, weather, elevation) = self.gather(latitude, longitude);
        let risk = calculate_risk_with(&self.params, &tide, &weather, &elevation);

        logging::debug(
            DataSource::System,
            Some(address),
            &format!(
                "Assessed ({:.4}, {:.4}): {:.1} grade {} confidence {:.2}",
                latitude, longitude, risk.score, risk.grade, risk.confidence
            ),
        );

        Ok(RiskAssessment {
            address: address.to_string(),
            latitude,
            longitude,
            risk,
            tide,
            weather,
            elevation,
            assessed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{ElevationSource, GridPoint, TideSource, WeatherSource};
    use crate::locations::NORFOLK_COVERAGE;
    use crate::model::{RiskGrade, TidePrediction, TideReading, WeatherPeriod};
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StaticTide {
        level: Option<f64>,
        calls: AtomicUsize,
    }

    impl TideSource for StaticTide {
        fn current_water_level(&self, station_id: &str) -> Result<TideReading, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.level
                .map(|water_level_ft| TideReading {
                    timestamp: Utc.with_ymd_and_hms(2024, 10, 3, 13, 18, 0).unwrap(),
                    water_level_ft,
                    station_id: station_id.to_string(),
                })
                .ok_or(GatewayError::Timeout)
        }

        fn predictions(&self, _station_id: &str, _hours: u32) -> Result<Vec<TidePrediction>, GatewayError> {
            Ok(Vec::new())
        }
    }

    struct StaticWeather(Option<WeatherSnapshot>);

    impl WeatherSource for StaticWeather {
        fn forecast(&self, _grid: &GridPoint) -> Result<WeatherSnapshot, GatewayError> {
            self.0.clone().ok_or(GatewayError::HttpError(503))
        }
    }

    struct StaticElevation(Option<f64>);

    impl ElevationSource for StaticElevation {
        fn elevation_ft(&self, _lat: f64, _lon: f64) -> Result<f64, GatewayError> {
            self.0.ok_or_else(|| GatewayError::RequestFailed("connection refused".to_string()))
        }
    }

    struct PanickingElevation;

    impl ElevationSource for PanickingElevation {
        fn elevation_ft(&self, _lat: f64, _lon: f64) -> Result<f64, GatewayError> {
            panic!("elevation worker blew up");
        }
    }

    fn storm_weather() -> WeatherSnapshot {
        WeatherSnapshot {
            periods: vec![WeatherPeriod {
                name: "Tonight".to_string(),
                temperature: 61,
                temperature_unit: "F".to_string(),
                wind_speed: "25 to 30 mph".to_string(),
                wind_direction: "NE".to_string(),
                short_forecast: "Rain".to_string(),
                detailed_forecast: String::new(),
                precipitation_chance: 60,
            }],
            precipitation_forecast_in: 1.0,
            wind_speed_mph: 30.0,
            wind_direction: "NE".to_string(),
        }
    }

    fn assessor(
        tide: Arc<StaticTide>,
        weather: Option<WeatherSnapshot>,
        elevation: Arc<dyn ElevationSource>,
    ) -> Assessor {
        let ttl = Duration::from_secs(300);
        Assessor::new(
            TideGateway::new(tide, "8638610", "Sewells Point, VA", 48, ttl),
            WeatherGateway::new(
                Arc::new(StaticWeather(weather)),
                GridPoint {
                    office: "AKQ".to_string(),
                    x: 89,
                    y: 76,
                },
                ttl,
            ),
            ElevationGateway::new(elevation, ttl, 500),
            NORFOLK_COVERAGE,
            ScoringParams::default(),
        )
    }

    #[test]
    fn test_healthy_sources_score_the_reference_scenario() {
        let a = assessor(
            Arc::new(StaticTide { level: Some(4.0), calls: AtomicUsize::new(0) }),
            Some(storm_weather()),
            Arc::new(StaticElevation(Some(5.0))),
        );
        let result = a.assess("Ghent", 36.8627, -76.3019).expect("inside coverage");
        assert_eq!(result.risk.score, 50.3);
        assert_eq!(result.risk.grade, RiskGrade::C);
        assert_eq!(result.risk.confidence, 0.9, "borderline 5 ft elevation costs 0.10");
        assert_eq!(result.address, "Ghent");
        assert!(!result.elevation.is_fallback());
    }

    #[test]
    fn test_outside_coverage_makes_no_upstream_calls() {
        let tide = Arc::new(StaticTide { level: Some(4.0), calls: AtomicUsize::new(0) });
        let a = assessor(Arc::clone(&tide), Some(storm_weather()), Arc::new(StaticElevation(Some(5.0))));

        let err = a.assess("Richmond", 37.5407, -77.4360).unwrap_err();
        assert_eq!(
            err,
            AssessmentError::OutsideCoverage {
                latitude: 37.5407,
                longitude: -77.4360
            }
        );
        assert_eq!(tide.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_sources_down_still_produces_assessment() {
        let a = assessor(
            Arc::new(StaticTide { level: None, calls: AtomicUsize::new(0) }),
            None,
            Arc::new(StaticElevation(None)),
        );
        let result = a.assess("Ocean View", 36.9557, -76.2530).expect("degrades, never fails");
        assert!(result.tide.current.is_none());
        assert!(result.elevation.is_fallback());
        assert_eq!(result.risk.confidence, 0.3);
        assert_eq!(result.risk.factors.tidal, 0.3);
    }

    #[test]
    fn test_panicking_worker_falls_back() {
        let a = assessor(
            Arc::new(StaticTide { level: Some(4.0), calls: AtomicUsize::new(0) }),
            Some(storm_weather()),
            Arc::new(PanickingElevation),
        );
        let (tide, _, elevation) = a.gather(36.8627, -76.3019);
        assert!(tide.current.is_some());
        assert!(elevation.is_fallback(), "panicked worker must yield the default elevation");
    }

    #[test]
    fn test_repeat_assessment_hits_tide_cache() {
        let tide = Arc::new(StaticTide { level: Some(2.0), calls: AtomicUsize::new(0) });
        let a = assessor(Arc::clone(&tide), Some(storm_weather()), Arc::new(StaticElevation(Some(8.0))));
        a.assess("Larchmont", 36.8785, -76.2893).expect("inside coverage");
        a.assess("Ghent", 36.8627, -76.3019).expect("inside coverage");
        assert_eq!(tide.calls.load(Ordering::SeqCst), 1);
    }
}
