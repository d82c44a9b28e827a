//! OpenStreetMap search via Overpass, narrowed by Nominatim geocoding.
//!
//! Free and global. Records that carry a website but no phone are passed
//! through [`WebsitePhoneFinder`] when enrichment is switched on.

mod geocode;
mod normalize;
mod query;

use std::time::Duration;

use alphaleads_core::{Lead, NormalizedCriteria};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

pub use normalize::osm_confidence;
pub use query::{build_overpass_query, country_bbox, tag_filters, BoundingBox};

use crate::adapter::{cached_search, decode_records, SourceAdapter, SourceSettings};
use crate::cache::TtlCache;
use crate::error::SourceError;
use crate::http::{build_client, normalize_base_url, read_json};
use crate::retry::retry_with_backoff;
use crate::website_phone::WebsitePhoneFinder;

use normalize::{normalize_element, rescore, OverpassElement, OverpassResponse};

pub const SOURCE_NAME: &str = "openstreetmap";

const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const OVERPASS_TIMEOUT: Duration = Duration::from_secs(35);
const NOMINATIM_TIMEOUT: Duration = Duration::from_secs(10);
const ENRICH_CONCURRENCY: usize = 4;

pub struct OsmAdapter {
    client: reqwest::Client,
    overpass_url: String,
    nominatim_url: String,
    enabled: bool,
    phone_finder: Option<WebsitePhoneFinder>,
    settings: SourceSettings,
    cache: TtlCache<Vec<Lead>>,
}

impl OsmAdapter {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if an HTTP client cannot be built.
    pub fn new(
        enabled: bool,
        phone_enrichment: bool,
        settings: &SourceSettings,
    ) -> Result<Self, SourceError> {
        Self::with_endpoints(
            enabled,
            phone_enrichment,
            settings,
            DEFAULT_OVERPASS_URL,
            DEFAULT_NOMINATIM_URL,
        )
    }

    /// Creates an adapter against custom Overpass and Nominatim endpoints.
    ///
    /// `overpass_url` is the full interpreter URL; `nominatim_url` is the
    /// service root that `/search` is appended to.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for a malformed URL or
    /// [`SourceError::Http`] if an HTTP client cannot be built.
    pub fn with_endpoints(
        enabled: bool,
        phone_enrichment: bool,
        settings: &SourceSettings,
        overpass_url: &str,
        nominatim_url: &str,
    ) -> Result<Self, SourceError> {
        let phone_finder = if phone_enrichment {
            Some(WebsitePhoneFinder::new(&settings.user_agent)?)
        } else {
            None
        };
        Ok(Self {
            client: build_client(OVERPASS_TIMEOUT, &settings.user_agent)?,
            overpass_url: normalize_base_url(overpass_url)?,
            nominatim_url: normalize_base_url(nominatim_url)?,
            enabled,
            phone_finder,
            settings: settings.clone(),
            cache: TtlCache::new(settings.cache_ttl),
        })
    }

    async fn fetch(&self, criteria: &NormalizedCriteria) -> Result<Vec<Lead>, SourceError> {
        let bbox = self.resolve_bbox(criteria).await;
        let query = build_overpass_query(criteria.industry, bbox, criteria.limit);
        tracing::debug!(source = SOURCE_NAME, %bbox, "querying Overpass");

        let response: OverpassResponse = retry_with_backoff(
            SOURCE_NAME,
            self.settings.max_retries,
            self.settings.retry_backoff_ms,
            || {
                let request = self
                    .client
                    .post(&self.overpass_url)
                    .form(&[("data", query.as_str())]);
                async move {
                    let resp = request.send().await?;
                    read_json(SOURCE_NAME, "overpass interpreter", resp).await
                }
            },
        )
        .await?;

        let leads: Vec<Lead> = decode_records::<OverpassElement>(SOURCE_NAME, response.elements)
            .into_iter()
            .filter_map(|e| normalize_element(e, criteria.industry, &criteria.country))
            .collect();

        Ok(self.enrich_phones(leads, &criteria.country).await)
    }

    /// Geocoded locality box when a city or location is given, otherwise the
    /// fixed country box. Geocoding failures fall back silently.
    async fn resolve_bbox(&self, criteria: &NormalizedCriteria) -> BoundingBox {
        let fallback = country_bbox(&criteria.country);
        if !criteria.has_locality() {
            return fallback;
        }

        let place = format!("{}, {}", criteria.location_string(), criteria.country);
        match geocode::geocode_bbox(&self.client, &self.nominatim_url, &place, NOMINATIM_TIMEOUT)
            .await
        {
            Ok(Some(bbox)) => bbox,
            Ok(None) => {
                tracing::debug!(source = SOURCE_NAME, place = %place, "no geocoding match, using country box");
                fallback
            }
            Err(e) => {
                tracing::warn!(source = SOURCE_NAME, place = %place, error = %e, "geocoding failed, using country box");
                fallback
            }
        }
    }

    /// Fills missing phones from business websites. Order is preserved.
    async fn enrich_phones(&self, leads: Vec<Lead>, country: &str) -> Vec<Lead> {
        let Some(finder) = &self.phone_finder else {
            return leads;
        };

        stream::iter(leads)
            .map(|mut lead| async move {
                if lead.has_phone() {
                    return lead;
                }
                let Some(website) = lead.website.clone() else {
                    return lead;
                };
                if let Some(phone) = finder.find(&website, country).await {
                    tracing::debug!(source = SOURCE_NAME, lead_id = %lead.id, "phone enriched from website");
                    lead.phone = Some(phone);
                    rescore(&mut lead);
                    lead.touch();
                }
                lead
            })
            .buffered(ENRICH_CONCURRENCY)
            .collect()
            .await
    }
}

#[async_trait]
impl SourceAdapter for OsmAdapter {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn search(&self, criteria: &NormalizedCriteria) -> Vec<Lead> {
        if !self.enabled {
            tracing::debug!(source = SOURCE_NAME, "OpenStreetMap disabled by configuration");
            return Vec::new();
        }
        cached_search(SOURCE_NAME, &self.cache, criteria, || self.fetch(criteria)).await
    }
}
