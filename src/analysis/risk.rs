//! Composite flood risk scoring.
//!
//! Computes a 0-100 score from four normalized factors:
//!
//! ```text
//!   R = w1*(T/Tmax) + w2*(1 - E/Eref) + w3*(P/Pthresh) + w4*S_wind
//! ```
//!
//! where T is the current water level above MLLW, E the ground elevation,
//! P the forecast precipitation and S_wind the direction-weighted wind
//! surge factor. Scoring never performs I/O and never fails: every missing
//! input has a defined fallback, and degraded inputs lower `confidence`
//! instead.

use crate::analysis::factors::{
    self, MISSING_TIDE_FACTOR, UNKNOWN_DIRECTION_MULTIPLIER, clamp_unit,
};
use crate::locations::SEWELLS_POINT;
use crate::model::{
    ElevationSnapshot, RiskFactors, RiskGrade, RiskScore, TideSnapshot, WeatherSnapshot,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Factor weights. Must sum to 1.0 or the effective score ceiling moves;
/// `config::Settings` rejects weights that do not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub tidal: f64,
    pub elevation: f64,
    pub precipitation: f64,
    pub wind: f64,
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.tidal + self.elevation + self.precipitation + self.wind
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-9
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            tidal: 0.35,
            elevation: 0.30,
            precipitation: 0.20,
            wind: 0.15,
        }
    }
}

/// Everything the engine needs besides the three snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub weights: RiskWeights,
    /// Normalization ceiling for the tidal factor, ft above MLLW.
    pub tidal_max_ft: f64,
    /// Elevation regarded as safe, ft.
    pub reference_elevation_ft: f64,
    /// Forecast rainfall at which the precipitation factor saturates, in.
    pub precip_threshold_in: f64,
    /// Wind speed at which the speed component saturates, mph.
    pub wind_full_scale_mph: f64,
    pub missing_tide_factor: f64,
    pub unknown_direction_multiplier: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            tidal_max_ft: SEWELLS_POINT.historical_max_ft,
            reference_elevation_ft: 12.0,
            precip_threshold_in: 3.0,
            wind_full_scale_mph: 60.0,
            missing_tide_factor: MISSING_TIDE_FACTOR,
            unknown_direction_multiplier: UNKNOWN_DIRECTION_MULTIPLIER,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Inclusive upper score bound for each grade, least severe first.
static GRADE_UPPER_BOUNDS: &[(f64, RiskGrade)] = &[
    (20.0, RiskGrade::A),
    (40.0, RiskGrade::B),
    (60.0, RiskGrade::C),
    (80.0, RiskGrade::D),
];

static GRADE_SUMMARIES: &[(RiskGrade, &str)] = &[
    (
        RiskGrade::A,
        "Low flood risk. Conditions are favorable with no significant threats.",
    ),
    (
        RiskGrade::B,
        "Minor flood risk. Some elevated conditions but no immediate concern.",
    ),
    (
        RiskGrade::C,
        "Moderate flood risk. Pay attention to conditions: low-lying areas may see water.",
    ),
    (
        RiskGrade::D,
        "High flood risk. Flooding likely in vulnerable areas. Take precautions.",
    ),
    (
        RiskGrade::F,
        "Severe flood risk. Significant flooding expected. Protect property and consider evacuation routes.",
    ),
];

const CONFIDENCE_PENALTY_NO_TIDE: f64 = 0.25;
const CONFIDENCE_PENALTY_NO_FORECAST: f64 = 0.20;
const CONFIDENCE_PENALTY_DEFAULT_ELEVATION: f64 = 0.20;
const CONFIDENCE_PENALTY_BORDERLINE_ELEVATION: f64 = 0.10;
/// Elevations in this band sit close enough to typical flood depths that
/// DEM rounding dominates.
const BORDERLINE_ELEVATION_FT: (f64, f64) = (3.0, 7.0);
const CONFIDENCE_FLOOR: f64 = 0.3;
const CONFIDENCE_CEILING: f64 = 1.0;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score with the default Norfolk parameters.
pub fn calculate_risk(
    tide: &TideSnapshot,
    weather: &WeatherSnapshot,
    elevation: &ElevationSnapshot,
) -> RiskScore {
    calculate_risk_with(&ScoringParams::default(), tide, weather, elevation)
}

pub fn calculate_risk_with(
    params: &ScoringParams,
    tide: &TideSnapshot,
    weather: &WeatherSnapshot,
    elevation: &ElevationSnapshot,
) -> RiskScore {
    let factors = compute_factors(params, tide, weather, elevation);
    let score = composite_score(&params.weights, &factors);
    let grade = grade_for_score(score);

    RiskScore {
        score,
        grade,
        factors,
        summary: summary_for_grade(grade).to_string(),
        recommendations: recommendations(grade, &factors.rounded()),
        confidence: round_to(estimate_confidence(tide, weather, elevation), 2),
    }
}

pub fn compute_factors(
    params: &ScoringParams,
    tide: &TideSnapshot,
    weather: &WeatherSnapshot,
    elevation: &ElevationSnapshot,
) -> RiskFactors {
    let level = tide.current.as_ref().map(|r| r.water_level_ft);
    let dir_mult =
        factors::direction_multiplier(&weather.wind_direction, params.unknown_direction_multiplier);

    RiskFactors {
        tidal: factors::tidal_factor(level, params.tidal_max_ft, params.missing_tide_factor),
        elevation: factors::elevation_factor(elevation.elevation_ft, params.reference_elevation_ft),
        precipitation: factors::precipitation_factor(
            weather.precipitation_forecast_in,
            params.precip_threshold_in,
        ),
        wind_surge: factors::wind_surge_factor(
            weather.wind_speed_mph,
            params.wind_full_scale_mph,
            dir_mult,
        ),
    }
}

/// Weighted sum scaled to 0-100 and rounded to one decimal.
pub fn composite_score(weights: &RiskWeights, f: &RiskFactors) -> f64 {
    let raw = weights.tidal * f.tidal
        + weights.elevation * f.elevation
        + weights.precipitation * f.precipitation
        + weights.wind * f.wind_surge;
    round_to(clamp_unit(raw) * 100.0, 1)
}

/// Bounds are inclusive: 20.0 is still A, 20.1 is B.
pub fn grade_for_score(score: f64) -> RiskGrade {
    GRADE_UPPER_BOUNDS
        .iter()
        .find(|(upper, _)| score <= *upper)
        .map(|(_, grade)| *grade)
        .unwrap_or(RiskGrade::F)
}

pub fn summary_for_grade(grade: RiskGrade) -> &'static str {
    GRADE_SUMMARIES
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, text)| *text)
        .unwrap_or("Unable to determine risk level.")
}

/// Independent conditions evaluated in a fixed order; all may fire.
/// `calculate_risk_with` passes the factors rounded as reported.
pub fn recommendations(grade: RiskGrade, f: &RiskFactors) -> Vec<String> {
    let mut recs = Vec::new();

    if matches!(grade, RiskGrade::D | RiskGrade::F) {
        recs.push("Move vehicles to higher ground".to_string());
        recs.push("Avoid driving through flooded streets".to_string());
        recs.push("Know your evacuation route".to_string());
    }
    if f.tidal > 0.6 {
        recs.push("High tide contributing to risk: avoid waterfront areas".to_string());
    }
    if f.precipitation > 0.5 {
        recs.push("Heavy rain expected: storm drains may back up in low areas".to_string());
    }
    if f.wind_surge > 0.5 {
        recs.push("Onshore winds increasing tidal surge risk".to_string());
    }
    if f.elevation > 0.7 {
        recs.push(
            "Your location is in a low-elevation zone. Stay alert during high water events"
                .to_string(),
        );
    }
    if grade == RiskGrade::A {
        recs.push("No action needed. Conditions are normal".to_string());
    }
    if grade == RiskGrade::B {
        recs.push("Monitor conditions if you're in a flood-prone area".to_string());
    }

    recs
}

/// Starts at full confidence and subtracts a fixed penalty per degraded
/// input, then clamps to [0.3, 1.0].
pub fn estimate_confidence(
    tide: &TideSnapshot,
    weather: &WeatherSnapshot,
    elevation: &ElevationSnapshot,
) -> f64 {
    let mut confidence = 1.0;

    if tide.current.is_none() {
        confidence -= CONFIDENCE_PENALTY_NO_TIDE;
    }
    if weather.periods.is_empty() {
        confidence -= CONFIDENCE_PENALTY_NO_FORECAST;
    }
    if elevation.is_fallback() {
        confidence -= CONFIDENCE_PENALTY_DEFAULT_ELEVATION;
    }
    let (low, high) = BORDERLINE_ELEVATION_FT;
    if (low..=high).contains(&elevation.elevation_ft) {
        confidence -= CONFIDENCE_PENALTY_BORDERLINE_ELEVATION;
    }

    f64::clamp(confidence, CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
