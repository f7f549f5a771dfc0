//! Flood risk alerting.
//!
//! - `thresholds`    — grade severity ordering and `should_alert`.
//! - `subscriptions` — thread-safe in-memory subscription registry.
//! - `notify`        — message construction, transports and the dispatcher.
//! - `cycle`         — evaluates every subscription against a fresh score.

pub mod cycle;
pub mod notify;
pub mod subscriptions;
pub mod thresholds;

pub use thresholds::should_alert;
