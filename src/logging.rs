/// Structured logging for the flood risk service
///
/// Provides context-rich logging with source tags and station/location
/// identifiers, timestamps, and severity levels. Supports both console
/// output and file-based logging for long-running alert cycles.

use crate::model::GatewayError;
use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Noaa,
    Nws,
    Usgs,
    Twilio,
    Alerts,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Noaa => write!(f, "NOAA"),
            DataSource::Nws => write!(f, "NWS"),
            DataSource::Usgs => write!(f, "USGS"),
            DataSource::Twilio => write!(f, "TWILIO"),
            DataSource::Alerts => write!(f, "ALERTS"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - station between updates or point outside dataset
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: DataSource, key: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let key_part = key.map(|k| format!(" [{}]", k)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, key_part, message);

        // Console output goes to stderr; stdout carries command results
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, key_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, key_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, source: DataSource, key: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, source, key, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, key: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, key, message);
}

/// Log a warning message
pub fn warn(source: DataSource, key: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, key, message);
}

/// Log an error message
pub fn error(source: DataSource, key: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, key, message);
}

/// Log a debug message
pub fn debug(source: DataSource, key: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, key, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a gateway failure by its error kind.
///
/// Empty payloads happen routinely (NOAA between 6-minute updates, EPQS
/// over open water) so they are Unknown rather than Unexpected.
pub fn classify_gateway_failure(err: &GatewayError) -> FailureType {
    match err {
        GatewayError::NoDataAvailable(_) => FailureType::Unknown,
        GatewayError::HttpError(code) if *code == 404 => FailureType::Unknown,
        GatewayError::HttpError(_)
        | GatewayError::Timeout
        | GatewayError::RequestFailed(_)
        | GatewayError::ParseError(_) => FailureType::Unexpected,
    }
}

/// Log a gateway failure with automatic classification. The caller is
/// about to substitute a fallback value, so the message says so.
pub fn log_gateway_failure(source: DataSource, key: &str, operation: &str, err: &GatewayError) {
    let failure_type = classify_gateway_failure(err);
    let message = format!(
        "{} failed [{}]: {} (using fallback)",
        operation, failure_type, err
    );

    match failure_type {
        FailureType::Expected => debug(source, Some(key), &message),
        FailureType::Unexpected => error(source, Some(key), &message),
        FailureType::Unknown => warn(source, Some(key), &message),
    }
}

// ---------------------------------------------------------------------------
// Alert Cycle Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one alert cycle
pub fn log_alert_cycle_summary(evaluated: usize, alerted: usize, failed: usize) {
    let message = format!(
        "Alert cycle complete: {} subscriptions evaluated, {} alerted, {} delivery failures",
        evaluated, alerted, failed
    );

    if failed == 0 {
        info(DataSource::Alerts, None, &message);
    } else if failed == alerted {
        error(DataSource::Alerts, None, &message);
    } else {
        warn(DataSource::Alerts, None, &message);
    }
}
