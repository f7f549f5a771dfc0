/// tidewatch_service: Norfolk, VA composite flood risk assessment.
///
/// # Module structure
///
/// ```text
/// tidewatch_service
/// ├── model       — shared data types (snapshots, RiskScore, subscriptions, errors)
/// ├── config      — Settings loaded from TOML + environment
/// ├── logging     — leveled, source-tagged logger with failure classification
/// ├── locations   — coverage area, tide station and sample location registry
/// ├── ingest
/// │   ├── cache   — bounded-age, single-flight TtlCache
/// │   ├── noaa    — NOAA CO-OPS water level + predictions
/// │   ├── nws     — NWS gridpoint forecast
/// │   ├── usgs    — USGS EPQS point elevation
/// │   ├── gateway — cached, fallback-on-failure gateways over the sources
/// │   └── fixtures (test only) — representative API response payloads
/// ├── analysis
/// │   ├── factors — per-signal normalization and lookup tables
/// │   └── risk    — composite score, grade, confidence, recommendations
/// ├── alert
/// │   ├── thresholds    — grade severity ordering and should_alert
/// │   ├── subscriptions — in-memory subscription registry
/// │   ├── notify        — message construction, transports, dispatcher
/// │   └── cycle         — evaluate every subscription and dispatch
/// ├── assess      — concurrent gather + score for one location
/// └── verify      — live data source verification report
/// ```

pub mod alert;
pub mod analysis;
pub mod assess;
pub mod config;
pub mod ingest;
pub mod locations;
pub mod logging;
pub mod model;
pub mod verify;
