/// Location registry for the Norfolk flood risk service.
///
/// Defines the supported coverage area, the NOAA tide station whose water
/// level drives the tidal factor, and a set of well-known Norfolk locations
/// used for quick checks from the command line. This is the single source of
/// truth for these coordinates; other modules reference them from here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tide station
// ---------------------------------------------------------------------------

/// Metadata for a NOAA CO-OPS water level station.
pub struct TideStation {
    /// 7-digit NOAA station id.
    pub station_id: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Highest observed water level at the station, feet above MLLW.
    /// Used as the normalization ceiling for the tidal factor.
    pub historical_max_ft: f64,
}

/// Sewells Point, at the mouth of the Elizabeth River. Its record level
/// (Hurricane Isabel, 2003) is roughly 7.9 ft MLLW; 7.5 ft is used as the
/// practical ceiling so major surge events saturate the factor.
pub const SEWELLS_POINT: TideStation = TideStation {
    station_id: "8638610",
    name: "Sewells Point, VA",
    latitude: 36.9467,
    longitude: -76.3300,
    historical_max_ft: 7.5,
};

// ---------------------------------------------------------------------------
// Coverage area
// ---------------------------------------------------------------------------

/// Inclusive lat/lon box within which assessments are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageArea {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl CoverageArea {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    pub fn describe(&self) -> String {
        format!(
            "{}-{}°N, {}-{}°W",
            self.min_latitude,
            self.max_latitude,
            -self.max_longitude,
            -self.min_longitude
        )
    }
}

impl Default for CoverageArea {
    fn default() -> Self {
        NORFOLK_COVERAGE
    }
}

/// Norfolk, VA: the area served by the Sewells Point station and the
/// AKQ 89,76 forecast grid.
pub const NORFOLK_COVERAGE: CoverageArea = CoverageArea {
    min_latitude: 36.7,
    max_latitude: 37.1,
    min_longitude: -76.5,
    max_longitude: -76.1,
};

// ---------------------------------------------------------------------------
// Sample locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SampleLocation {
    pub name: &'static str,
    pub address: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub note: &'static str,
}

/// Well-known Norfolk neighbourhoods spanning waterfront and inland sites.
pub static SAMPLE_LOCATIONS: &[SampleLocation] = &[
    SampleLocation {
        name: "Ghent / The Hague",
        address: "Ghent, Norfolk, VA",
        latitude: 36.8695,
        longitude: -76.2960,
        note: "Historically flood-prone neighborhood",
    },
    SampleLocation {
        name: "Larchmont",
        address: "Larchmont, Norfolk, VA",
        latitude: 36.8760,
        longitude: -76.2890,
        note: "Low-lying residential area near Lafayette River",
    },
    SampleLocation {
        name: "Downtown Norfolk",
        address: "Downtown Norfolk, VA",
        latitude: 36.8468,
        longitude: -76.2852,
        note: "Waterfront area near Town Point Park",
    },
    SampleLocation {
        name: "Ocean View",
        address: "Ocean View, Norfolk, VA",
        latitude: 36.9260,
        longitude: -76.2530,
        note: "Chesapeake Bay waterfront community",
    },
    SampleLocation {
        name: "The Assembly",
        address: "Assembly, Norfolk, VA",
        latitude: 36.8562,
        longitude: -76.2590,
        note: "The Assembly campus",
    },
];

/// Looks up a sample location by name, case-insensitively.
pub fn find_sample(name: &str) -> Option<&'static SampleLocation> {
    SAMPLE_LOCATIONS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
