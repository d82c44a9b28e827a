//! Overpass QL construction.

use std::fmt;

use alphaleads_core::Industry;

/// Geographic bounding box in Overpass order: south, west, north, east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.south, self.west, self.north, self.east)
    }
}

const BANGLADESH: BoundingBox = BoundingBox {
    south: 20.5,
    west: 88.0,
    north: 26.7,
    east: 92.7,
};

const UNITED_STATES: BoundingBox = BoundingBox {
    south: 24.0,
    west: -125.0,
    north: 50.0,
    east: -66.0,
};

const UNITED_KINGDOM: BoundingBox = BoundingBox {
    south: 49.9,
    west: -8.2,
    north: 60.9,
    east: 1.8,
};

/// Fixed country-level box used when no locality is geocoded.
///
/// Unknown countries fall back to the United States.
#[must_use]
pub fn country_bbox(country: &str) -> BoundingBox {
    match country.trim().to_lowercase().as_str() {
        "bd" | "bangladesh" => BANGLADESH,
        "uk" | "gb" => UNITED_KINGDOM,
        _ => UNITED_STATES,
    }
}

/// `(key, value-regex)` tag filters queried for each industry.
#[must_use]
pub fn tag_filters(industry: Industry) -> &'static [(&'static str, &'static str)] {
    match industry {
        Industry::RealEstate => &[("office", "estate_agent"), ("shop", "estate_agent")],
        Industry::Insurance => &[("office", "insurance"), ("shop", "insurance")],
        Industry::Construction => &[("office", "construction"), ("craft", "builder")],
        Industry::Healthcare => &[("amenity", "clinic"), ("healthcare", "doctor")],
        Industry::Legal => &[("office", "lawyer"), ("amenity", "courthouse")],
        Industry::Retail => &[("shop", ".*")],
        Industry::Mortgage => &[("office", "financial"), ("amenity", "bank")],
        Industry::PropertyManagement => &[
            ("office", "property_management"),
            ("office", "estate_agent"),
        ],
        Industry::Automotive => &[("shop", "car"), ("shop", "car_repair")],
        Industry::Other => &[("office", ".*")],
    }
}

/// Builds the Overpass QL union of node and way selectors for `industry`
/// inside `bbox`, returning at most `limit` elements with way centres.
#[must_use]
pub fn build_overpass_query(industry: Industry, bbox: BoundingBox, limit: usize) -> String {
    let selectors: String = tag_filters(industry)
        .iter()
        .map(|(key, value)| {
            format!("node[\"{key}\"~\"{value}\",i]{bbox};way[\"{key}\"~\"{value}\",i]{bbox};")
        })
        .collect();
    format!("[out:json][timeout:25];({selectors});out center {limit};")
}
