/// Service configuration.
///
/// Settings come from a TOML file (path in `TIDEWATCH_CONFIG`, default
/// `tidewatch.toml`; a missing file means all defaults), then environment
/// variables loaded through `.env` override secrets and a few operational
/// values. Every field has a Norfolk, VA default.

use crate::analysis::risk::ScoringParams;
use crate::ingest::GridPoint;
use crate::locations::{CoverageArea, SEWELLS_POINT};
use crate::logging::LogLevel;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "tidewatch.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    /// Risk weights must sum to 1.0; carries the actual sum.
    InvalidWeights(f64),
    InvalidValue { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidWeights(sum) => {
                write!(f, "Risk weights must sum to 1.0, got {}", sum)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoaaSettings {
    pub station_id: String,
    pub station_name: String,
    pub base_url: String,
    /// Prediction horizon fetched for each assessment.
    pub prediction_hours: u32,
}

impl Default for NoaaSettings {
    fn default() -> Self {
        Self {
            station_id: SEWELLS_POINT.station_id.to_string(),
            station_name: SEWELLS_POINT.name.to_string(),
            base_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
            prediction_hours: 48,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NwsSettings {
    pub base_url: String,
    pub office: String,
    pub grid_x: u32,
    pub grid_y: u32,
    /// NWS rejects requests without an identifying User-Agent.
    pub user_agent: String,
}

impl NwsSettings {
    pub fn grid(&self) -> GridPoint {
        GridPoint {
            office: self.office.clone(),
            x: self.grid_x,
            y: self.grid_y,
        }
    }
}

impl Default for NwsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.weather.gov".to_string(),
            office: "AKQ".to_string(),
            grid_x: 89,
            grid_y: 76,
            user_agent: "(TideWatch, tidewatch@example.com)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsgsSettings {
    pub elevation_url: String,
}

impl Default for UsgsSettings {
    fn default() -> Self {
        Self {
            elevation_url: "https://epqs.nationalmap.gov/v1/json".to_string(),
        }
    }
}

/// SMS credentials. Normally supplied by environment, not the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl TwilioSettings {
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// NOAA publishes every 6 minutes.
    pub tide_ttl_secs: u64,
    pub weather_ttl_secs: u64,
    /// Terrain is static.
    pub elevation_ttl_secs: u64,
    pub elevation_max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            tide_ttl_secs: 360,
            weather_ttl_secs: 1800,
            elevation_ttl_secs: 86_400,
            elevation_max_entries: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    /// Upper bound on every outbound HTTP call.
    pub request_timeout_secs: u64,
    pub noaa: NoaaSettings,
    pub nws: NwsSettings,
    pub usgs: UsgsSettings,
    pub twilio: TwilioSettings,
    pub cache: CacheSettings,
    pub scoring: ScoringParams,
    pub coverage: CoverageArea,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "TideWatch".to_string(),
            request_timeout_secs: 10,
            noaa: NoaaSettings::default(),
            nws: NwsSettings::default(),
            usgs: UsgsSettings::default(),
            twilio: TwilioSettings::default(),
            cache: CacheSettings::default(),
            scoring: ScoringParams::default(),
            coverage: CoverageArea::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Loads `.env`, the TOML file named by `TIDEWATCH_CONFIG` (or the
    /// default path) and environment overrides, then validates.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let path = std::env::var("TIDEWATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut settings = Self::from_file_or_default(&path)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Reads `path` if it exists; otherwise returns defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment overrides through `lookup` so tests need not
    /// touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = v;
        }
        if let Some(v) = lookup("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = v;
        }
        if let Some(v) = lookup("TWILIO_FROM_NUMBER") {
            self.twilio.from_number = v;
        }
        if let Some(v) = lookup("NOAA_STATION_ID") {
            self.noaa.station_id = v;
        }
        if let Some(v) = lookup("TIDEWATCH_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scoring.weights.is_normalized() {
            return Err(ConfigError::InvalidWeights(self.scoring.weights.sum()));
        }
        let positive = [
            ("scoring.tidal_max_ft", self.scoring.tidal_max_ft),
            ("scoring.reference_elevation_ft", self.scoring.reference_elevation_ft),
            ("scoring.precip_threshold_in", self.scoring.precip_threshold_in),
            ("scoring.wind_full_scale_mph", self.scoring.wind_full_scale_mph),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging
            .level
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "logging.level",
                reason,
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid_norfolk_values() {
        let s = Settings::default();
        s.validate().expect("defaults must validate");
        assert_eq!(s.noaa.station_id, "8638610");
        assert_eq!(s.nws.grid().to_string(), "AKQ/89,76");
        assert_eq!(s.scoring.reference_elevation_ft, 12.0);
        assert_eq!(s.scoring.tidal_max_ft, 7.5);
        assert_eq!(s.request_timeout(), Duration::from_secs(10));
        assert!(!s.twilio.is_configured());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let s = Settings::from_toml_str(
            r#"
            request_timeout_secs = 5

            [cache]
            weather_ttl_secs = 600

            [scoring]
            precip_threshold_in = 2.5
            "#,
        )
        .expect("valid toml");
        assert_eq!(s.request_timeout_secs, 5);
        assert_eq!(s.cache.weather_ttl_secs, 600);
        assert_eq!(s.cache.tide_ttl_secs, 360);
        assert_eq!(s.scoring.precip_threshold_in, 2.5);
        assert!(s.scoring.weights.is_normalized());
    }

    #[test]
    fn test_weights_not_summing_to_one_are_rejected() {
        let s = Settings::from_toml_str(
            r#"
            [scoring.weights]
            tidal = 0.5
            elevation = 0.3
            precipitation = 0.2
            wind = 0.15
            "#,
        )
        .expect("valid toml");
        match s.validate() {
            Err(ConfigError::InvalidWeights(sum)) => assert!((sum - 1.15).abs() < 1e-9),
            other => panic!("expected InvalidWeights, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let mut s = Settings::default();
        s.scoring.precip_threshold_in = 0.0;
        assert!(matches!(
            s.validate(),
            Err(ConfigError::InvalidValue { field: "scoring.precip_threshold_in", .. })
        ));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut s = Settings::default();
        s.logging.level = "chatty".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_env_overrides_fill_twilio_credentials() {
        let env: HashMap<&str, &str> = [
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_FROM_NUMBER", "+17575550000"),
        ]
        .into_iter()
        .collect();
        let mut s = Settings::default();
        s.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert!(s.twilio.is_configured());
        assert_eq!(s.noaa.station_id, "8638610", "unset vars leave defaults");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            Settings::from_toml_str("request_timeout_secs = \"ten\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let s = Settings::from_file_or_default(Path::new("/nonexistent/tidewatch.toml"))
            .expect("missing file is not an error");
        assert_eq!(s.app_name, "TideWatch");
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let s = Settings::from_toml_str(include_str!("../tidewatch.toml")).expect("bundled file parses");
        s.validate().expect("bundled file is valid");
        let d = Settings::default();
        assert_eq!(s.noaa.station_id, d.noaa.station_id);
        assert_eq!(s.nws.grid(), d.nws.grid());
        assert_eq!(s.scoring, d.scoring);
        assert_eq!(s.coverage, d.coverage);
        assert_eq!(s.cache.elevation_max_entries, d.cache.elevation_max_entries);
    }
}
