//! Alert threshold evaluation.
//!
//! Grades are totally ordered A < B < C < D < F. A subscriber's threshold
//! fires whenever the computed grade is at least as severe. Unknown
//! threshold strings read as C so evaluation never fails.

use crate::logging::{self, DataSource};
use crate::model::{RiskGrade, RiskScore};
use serde::{Deserialize, Deserializer};

/// Threshold assumed for new subscriptions and unreadable threshold values.
pub const DEFAULT_THRESHOLD: RiskGrade = RiskGrade::C;

/// Severity per grade, least severe first.
static GRADE_SEVERITY: &[(RiskGrade, u8)] = &[
    (RiskGrade::A, 0),
    (RiskGrade::B, 1),
    (RiskGrade::C, 2),
    (RiskGrade::D, 3),
    (RiskGrade::F, 4),
];

pub fn severity(grade: RiskGrade) -> u8 {
    GRADE_SEVERITY
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, s)| *s)
        .unwrap_or(0)
}

/// Parses a threshold leniently: anything that is not a grade letter is C.
pub fn parse_threshold(threshold: &str) -> RiskGrade {
    threshold.parse().unwrap_or(DEFAULT_THRESHOLD)
}

pub fn meets_threshold(grade: RiskGrade, threshold: RiskGrade) -> bool {
    severity(grade) >= severity(threshold)
}

/// Returns `true` if the risk grade meets or exceeds the threshold grade.
pub fn should_alert(risk: &RiskScore, threshold_grade: &str) -> bool {
    meets_threshold(risk.grade, parse_threshold(threshold_grade))
}

// ---------------------------------------------------------------------------
// Serde helpers for AlertSubscription::threshold_grade
// ---------------------------------------------------------------------------

pub fn default_threshold() -> RiskGrade {
    DEFAULT_THRESHOLD
}

pub fn deserialize_threshold<'de, D>(deserializer: D) -> Result<RiskGrade, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.parse::<RiskGrade>() {
        Ok(grade) => Ok(grade),
        Err(_) => {
            logging::warn(
                DataSource::Alerts,
                None,
                &format!("Unknown threshold grade '{}', using {}", raw, DEFAULT_THRESHOLD),
            );
            Ok(DEFAULT_THRESHOLD)
        }
    }
}
