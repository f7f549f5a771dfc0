//! Per-signal risk factor normalization.
//!
//! Each function maps one raw environmental reading onto [0,1], where 1 is
//! the worst case for flooding. Every function is total: negative, huge,
//! infinite and NaN inputs all land inside [0,1].

/// Tidal factor used when no current water level is available. A moderate
/// value, not zero: absence of data must not look like absence of risk.
/// Tunable heuristic with no physical derivation.
pub const MISSING_TIDE_FACTOR: f64 = 0.3;

/// Wind direction multiplier for empty or unrecognized compass codes.
/// Tunable heuristic with no physical derivation.
pub const UNKNOWN_DIRECTION_MULTIPLIER: f64 = 0.5;

/// Onshore surge multiplier per 16-point compass code. Norfolk is most
/// exposed to NE and E winds, which push water up the Chesapeake Bay and
/// into the Elizabeth River; westerlies push it out.
pub static DIRECTION_MULTIPLIERS: &[(&str, f64)] = &[
    ("N", 0.7),
    ("NNE", 0.85),
    ("NE", 1.0),
    ("ENE", 0.95),
    ("E", 0.9),
    ("ESE", 0.7),
    ("SE", 0.5),
    ("SSE", 0.4),
    ("S", 0.3),
    ("SSW", 0.2),
    ("SW", 0.2),
    ("WSW", 0.15),
    ("W", 0.1),
    ("WNW", 0.15),
    ("NW", 0.3),
    ("NNW", 0.4),
];

/// Clamp to [0,1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Surge multiplier for a compass code, case-insensitive.
pub fn direction_multiplier(direction: &str, unknown_default: f64) -> f64 {
    let code = direction.trim().to_ascii_uppercase();
    DIRECTION_MULTIPLIERS
        .iter()
        .find(|(dir, _)| *dir == code)
        .map(|(_, mult)| *mult)
        .unwrap_or(unknown_default)
}

/// Current water level normalized against the station's historical max.
pub fn tidal_factor(water_level_ft: Option<f64>, historical_max_ft: f64, missing_default: f64) -> f64 {
    match water_level_ft {
        Some(level) if !level.is_nan() => clamp_unit(level / historical_max_ft),
        _ => clamp_unit(missing_default),
    }
}

/// Lower ground is riskier. At or below sea level is the maximum.
pub fn elevation_factor(elevation_ft: f64, reference_elevation_ft: f64) -> f64 {
    // NaN fails `> 0.0` and is treated like sea level.
    if !(elevation_ft > 0.0) {
        return 1.0;
    }
    clamp_unit(1.0 - elevation_ft / reference_elevation_ft)
}

pub fn precipitation_factor(precip_in: f64, threshold_in: f64) -> f64 {
    clamp_unit(precip_in / threshold_in)
}

/// Wind speed scaled so that `full_scale_mph` (tropical storm force) is 1.0,
/// then weighted by how onshore the direction is.
pub fn wind_surge_factor(wind_mph: f64, full_scale_mph: f64, direction_mult: f64) -> f64 {
    let speed = clamp_unit(wind_mph / full_scale_mph);
    clamp_unit(speed * direction_mult)
}
