//! Nominatim place lookup, used to narrow Overpass queries to a locality.

use std::time::Duration;

use serde::Deserialize;

use super::query::BoundingBox;
use crate::error::SourceError;
use crate::http::read_json;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    /// `[south, north, west, east]` as decimal strings.
    #[serde(default)]
    boundingbox: Vec<String>,
}

/// Looks up `place` and returns the first match's bounding box.
///
/// `Ok(None)` means Nominatim answered but had no usable match.
pub(crate) async fn geocode_bbox(
    client: &reqwest::Client,
    base_url: &str,
    place: &str,
    timeout: Duration,
) -> Result<Option<BoundingBox>, SourceError> {
    let resp = client
        .get(format!("{base_url}/search"))
        .query(&[("q", place), ("format", "json"), ("limit", "1")])
        .timeout(timeout)
        .send()
        .await?;
    let places: Vec<NominatimPlace> = read_json("nominatim", "nominatim search", resp).await?;
    Ok(places.first().and_then(parse_bbox))
}

fn parse_bbox(place: &NominatimPlace) -> Option<BoundingBox> {
    let [south, north, west, east] = place.boundingbox.as_slice() else {
        return None;
    };
    Some(BoundingBox {
        south: south.parse().ok()?,
        west: west.parse().ok()?,
        north: north.parse().ok()?,
        east: east.parse().ok()?,
    })
}
