//! Cached, fail-safe gateways over the upstream sources.
//!
//! A gateway never returns an error. On any fetch failure it logs the
//! classified failure and hands back the documented degraded value, which
//! the risk engine turns into lower confidence rather than a failed request.
//! Failed fetches are not cached, so the next call retries upstream.

use crate::config::Settings;
use crate::ingest::cache::{TtlCache, ttl_cache};
use crate::ingest::noaa::NoaaClient;
use crate::ingest::nws::NwsClient;
use crate::ingest::usgs::UsgsElevationClient;
use crate::ingest::{ElevationSource, GridPoint, TideSource, WeatherSource, http_client};
use crate::logging::{self, DataSource};
use crate::model::{
    ElevationSnapshot, GatewayError, TidePrediction, TideReading, TideSnapshot,
    USGS_ELEVATION_SOURCE, WeatherSnapshot,
};
use std::sync::Arc;
use std::time::Duration;

/// Longest prediction window served.
pub const MAX_PREDICTION_HOURS: u32 = 168;

/// Coordinates are rounded to this many decimal places (≈1 m) before they
/// become a cache key, so near-identical lookups share an entry.
pub const COORDINATE_KEY_DECIMALS: i32 = 5;

// ---------------------------------------------------------------------------
// Tide
// ---------------------------------------------------------------------------

pub struct TideGateway {
    source: Arc<dyn TideSource>,
    station_id: String,
    station_name: String,
    prediction_hours: u32,
    current_cache: TtlCache<String, TideReading>,
    prediction_cache: TtlCache<(String, u32), Vec<TidePrediction>>,
}

impl TideGateway {
    pub fn new(
        source: Arc<dyn TideSource>,
        station_id: &str,
        station_name: &str,
        prediction_hours: u32,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            station_id: station_id.to_string(),
            station_name: station_name.to_string(),
            prediction_hours: prediction_hours.min(MAX_PREDICTION_HOURS),
            current_cache: ttl_cache(ttl, 4),
            prediction_cache: ttl_cache(ttl, 16),
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// Latest water level, or `None` if the station could not be read.
    pub fn current(&self) -> Option<TideReading> {
        self.current_cache
            .try_get_with(self.station_id.clone(), || {
                self.source.current_water_level(&self.station_id)
            })
            .map_err(|e| {
                logging::log_gateway_failure(DataSource::Noaa, &self.station_id, "Water level fetch", &e)
            })
            .ok()
    }

    /// Predictions for up to `MAX_PREDICTION_HOURS`; empty on failure.
    pub fn predictions(&self, hours: u32) -> Vec<TidePrediction> {
        let hours = hours.min(MAX_PREDICTION_HOURS);
        self.prediction_cache
            .try_get_with((self.station_id.clone(), hours), || {
                self.source.predictions(&self.station_id, hours)
            })
            .unwrap_or_else(|e| {
                logging::log_gateway_failure(DataSource::Noaa, &self.station_id, "Prediction fetch", &e);
                Vec::new()
            })
    }

    /// Current reading plus the configured prediction window.
    pub fn snapshot(&self) -> TideSnapshot {
        TideSnapshot {
            current: self.current(),
            predictions: self.predictions(self.prediction_hours),
            station_name: self.station_name.clone(),
        }
    }

    pub fn unavailable(&self) -> TideSnapshot {
        TideSnapshot::unavailable(&self.station_name)
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

pub struct WeatherGateway {
    source: Arc<dyn WeatherSource>,
    grid: GridPoint,
    cache: TtlCache<GridPoint, WeatherSnapshot>,
}

impl WeatherGateway {
    pub fn new(source: Arc<dyn WeatherSource>, grid: GridPoint, ttl: Duration) -> Self {
        Self {
            source,
            grid,
            cache: ttl_cache(ttl, 4),
        }
    }

    /// Forecast for the configured grid; an empty snapshot on failure.
    pub fn forecast(&self) -> WeatherSnapshot {
        self.cache
            .try_get_with(self.grid.clone(), || self.source.forecast(&self.grid))
            .unwrap_or_else(|e| {
                logging::log_gateway_failure(DataSource::Nws, &self.grid.to_string(), "Forecast fetch", &e);
                WeatherSnapshot::default()
            })
    }
}

// ---------------------------------------------------------------------------
// Elevation
// ---------------------------------------------------------------------------

/// Rounded coordinate pair in units of 10^-5 degrees.
pub type CoordinateKey = (i64, i64);

pub fn coordinate_key(latitude: f64, longitude: f64) -> CoordinateKey {
    let scale = 10f64.powi(COORDINATE_KEY_DECIMALS);
    ((latitude * scale).round() as i64, (longitude * scale).round() as i64)
}

pub struct ElevationGateway {
    source: Arc<dyn ElevationSource>,
    cache: TtlCache<CoordinateKey, ElevationSnapshot>,
}

impl ElevationGateway {
    pub fn new(source: Arc<dyn ElevationSource>, ttl: Duration, max_entries: usize) -> Self {
        Self {
            source,
            cache: ttl_cache(ttl, max_entries as u64),
        }
    }

    /// Ground elevation at a point; the conservative default on failure.
    pub fn elevation_at(&self, latitude: f64, longitude: f64) -> ElevationSnapshot {
        self.cache
            .try_get_with(coordinate_key(latitude, longitude), || {
                self.source
                    .elevation_ft(latitude, longitude)
                    .map(|elevation_ft| ElevationSnapshot {
                        latitude,
                        longitude,
                        elevation_ft,
                        source: USGS_ELEVATION_SOURCE.to_string(),
                    })
            })
            .unwrap_or_else(|e| {
                let key = format!("{:.5},{:.5}", latitude, longitude);
                logging::log_gateway_failure(DataSource::Usgs, &key, "Elevation lookup", &e);
                ElevationSnapshot::fallback(latitude, longitude)
            })
    }
}

// ---------------------------------------------------------------------------
// Construction from settings
// ---------------------------------------------------------------------------

/// The three live gateways, wired to the real upstream APIs.
pub struct Gateways {
    pub tide: TideGateway,
    pub weather: WeatherGateway,
    pub elevation: ElevationGateway,
}

impl Gateways {
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        let timeout = settings.request_timeout();
        let agent = settings.nws.user_agent.as_str();
        let cache = &settings.cache;

        let noaa = NoaaClient::new(http_client(timeout, agent)?, &settings.noaa.base_url);
        let nws = NwsClient::new(http_client(timeout, agent)?, &settings.nws.base_url);
        let usgs = UsgsElevationClient::new(http_client(timeout, agent)?, &settings.usgs.elevation_url);

        Ok(Self {
            tide: TideGateway::new(
                Arc::new(noaa),
                &settings.noaa.station_id,
                &settings.noaa.station_name,
                settings.noaa.prediction_hours,
                Duration::from_secs(cache.tide_ttl_secs),
            ),
            weather: WeatherGateway::new(
                Arc::new(nws),
                settings.nws.grid(),
                Duration::from_secs(cache.weather_ttl_secs),
            ),
            elevation: ElevationGateway::new(
                Arc::new(usgs),
                Duration::from_secs(cache.elevation_ttl_secs),
                cache.elevation_max_entries,
            ),
        })
    }
}
