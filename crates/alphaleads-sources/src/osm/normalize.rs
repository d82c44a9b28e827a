//! Overpass element → [`Lead`] mapping and OSM confidence scoring.

use std::collections::HashMap;

use alphaleads_core::{Address, BusinessHours, Coordinates, Industry, Lead, LeadSource};
use chrono::Utc;
use serde::Deserialize;

use super::SOURCE_NAME;
use crate::adapter::non_blank;

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub(crate) elements: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

const PHONE_SOURCE_CONFIDENCE: u8 = 80;
const NO_PHONE_SOURCE_CONFIDENCE: u8 = 70;

/// Confidence for an OSM-sourced lead.
///
/// Base 40, phone +25, website +15, email +15, street +5, capped at 100.
/// Computed from the finished record so an enriched phone counts, and a
/// `contact:*` fallback tag scores like its primary tag.
#[must_use]
pub fn osm_confidence(lead: &Lead) -> u8 {
    let mut score: u32 = 40;
    if lead.has_phone() {
        score += 25;
    }
    if lead.has_website() {
        score += 15;
    }
    if lead.has_email() {
        score += 15;
    }
    if lead.address.has_street() {
        score += 5;
    }
    u8::try_from(score.min(100)).unwrap_or(100)
}

/// Recomputes both the lead score and its OSM source-entry confidence.
pub(crate) fn rescore(lead: &mut Lead) {
    let entry = if lead.has_phone() {
        PHONE_SOURCE_CONFIDENCE
    } else {
        NO_PHONE_SOURCE_CONFIDENCE
    };
    if let Some(source) = lead.sources.iter_mut().find(|s| s.name == SOURCE_NAME) {
        source.confidence = entry;
    }
    lead.confidence = osm_confidence(lead);
}

/// Maps one Overpass element. Elements without a `name` tag yield `None`.
pub(crate) fn normalize_element(
    element: OverpassElement,
    industry: Industry,
    country: &str,
) -> Option<Lead> {
    let tag = |key: &str| non_blank(element.tags.get(key).map(String::as_str));
    let either = |primary: &str, fallback: &str| tag(primary).or_else(|| tag(fallback));

    let name = tag("name")?;
    let source = LeadSource {
        name: SOURCE_NAME.to_string(),
        source_id: element.id.to_string(),
        url: Some(format!(
            "https://www.openstreetmap.org/{}/{}",
            element.kind, element.id
        )),
        collected_at: Utc::now(),
        confidence: NO_PHONE_SOURCE_CONFIDENCE,
    };

    let mut lead = Lead::new(format!("osm_{}", element.id), name, industry, source);
    lead.business_type = tag("shop")
        .or_else(|| tag("office"))
        .or_else(|| tag("amenity"))
        .unwrap_or_else(|| "Business".to_string());
    lead.contact_name = tag("operator");
    lead.phone = either("phone", "contact:phone");
    lead.email = either("email", "contact:email");
    lead.website = either("website", "contact:website");

    lead.address = Address {
        street: tag("addr:street").map(|street| match tag("addr:housenumber") {
            Some(number) => format!("{number} {street}"),
            None => street,
        }),
        city: tag("addr:city"),
        state: tag("addr:state"),
        zip_code: tag("addr:postcode"),
        country: tag("addr:country").or_else(|| Some(country.to_uppercase())),
        coordinates: coordinates(&element),
    };

    let details = &mut lead.business_details;
    details.description = tag("description");
    details.year_established = tag("start_date").and_then(|d| leading_year(&d));
    if let Some(raw) = tag("opening_hours") {
        details.hours = vec![BusinessHours {
            day: "General".to_string(),
            open: None,
            close: None,
            closed: false,
            raw: Some(raw),
        }];
    }

    rescore(&mut lead);
    Some(lead)
}

fn coordinates(element: &OverpassElement) -> Option<Coordinates> {
    match (element.lat, element.lon, &element.center) {
        (Some(lat), Some(lng), _) => Some(Coordinates { lat, lng }),
        (_, _, Some(center)) => Some(Coordinates {
            lat: center.lat,
            lng: center.lon,
        }),
        _ => None,
    }
}

fn leading_year(start_date: &str) -> Option<i32> {
    let digits: String = start_date
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
