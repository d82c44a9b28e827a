//! Yelp Fusion business search.
//!
//! US-only and gated on `YELP_API_KEY`. Provider-native response types stay
//! private to this module; callers only ever see [`Lead`].

use std::time::Duration;

use alphaleads_core::{
    Address, BusinessHours, Coordinates, Industry, Lead, LeadSource, NormalizedCriteria,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::adapter::{cached_search, decode_records, non_blank, SourceAdapter, SourceSettings};
use crate::cache::TtlCache;
use crate::error::SourceError;
use crate::http::{build_client, normalize_base_url, read_json};
use crate::retry::retry_with_backoff;

pub const SOURCE_NAME: &str = "yelp";

const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_PAGE_SIZE: usize = 50;
const SEARCH_RADIUS_METERS: u32 = 25_000;
const SOURCE_ENTRY_CONFIDENCE: u8 = 90;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Deserialize)]
struct YelpSearchResponse {
    #[serde(default)]
    businesses: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YelpBusiness {
    id: String,
    name: Option<String>,
    url: Option<String>,
    phone: Option<String>,
    display_phone: Option<String>,
    rating: Option<f64>,
    review_count: Option<u32>,
    review_snippet: Option<String>,
    #[serde(default)]
    categories: Vec<YelpCategory>,
    location: Option<YelpLocation>,
    coordinates: Option<YelpCoordinates>,
    #[serde(default)]
    hours: Vec<YelpHours>,
}

#[derive(Debug, Deserialize)]
struct YelpCategory {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YelpLocation {
    address1: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YelpCoordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YelpHours {
    #[serde(default)]
    open: Vec<YelpOpenSlot>,
}

#[derive(Debug, Deserialize)]
struct YelpOpenSlot {
    day: Option<usize>,
    start: Option<String>,
    end: Option<String>,
}

/// Yelp category aliases queried for each industry.
#[must_use]
pub fn yelp_category(industry: Industry) -> &'static str {
    match industry {
        Industry::RealEstate => "realestate",
        Industry::Mortgage => "mortgagebrokers",
        Industry::Insurance => "insurance",
        Industry::Construction => "contractors",
        Industry::PropertyManagement => "propertymgmt",
        Industry::Healthcare => "physicians",
        Industry::Legal => "lawyers",
        Industry::Automotive => "auto",
        Industry::Retail => "shopping",
        Industry::Other => "professional",
    }
}

/// Confidence for a Yelp-sourced lead.
///
/// Base 50, phone +20, rating of at least 4.0 +15, more than ten reviews
/// +10, street address +5, capped at 100.
#[must_use]
pub fn yelp_confidence(lead: &Lead) -> u8 {
    let mut score: u32 = 50;
    if lead.has_phone() {
        score += 20;
    }
    if lead.business_details.rating.is_some_and(|r| r >= 4.0) {
        score += 15;
    }
    if lead.business_details.review_count.is_some_and(|n| n > 10) {
        score += 10;
    }
    if lead.address.has_street() {
        score += 5;
    }
    u8::try_from(score.min(100)).unwrap_or(100)
}

pub struct YelpAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    settings: SourceSettings,
    cache: TtlCache<Vec<Lead>>,
}

impl YelpAdapter {
    /// Creates an adapter against the public Yelp Fusion endpoint.
    ///
    /// A `None` key yields a disabled adapter that always returns no leads.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>, settings: &SourceSettings) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// Creates an adapter against a custom base URL (tests, proxies).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for a malformed URL or
    /// [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: Option<String>,
        settings: &SourceSettings,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT, &settings.user_agent)?,
            api_key,
            base_url: normalize_base_url(base_url)?,
            settings: settings.clone(),
            cache: TtlCache::new(settings.cache_ttl),
        })
    }

    async fn fetch(&self, api_key: &str, criteria: &NormalizedCriteria) -> Result<Vec<Lead>, SourceError> {
        let url = format!("{}/businesses/search", self.base_url);
        let limit = criteria.limit.min(MAX_PAGE_SIZE).to_string();
        let radius = SEARCH_RADIUS_METERS.to_string();
        let location = criteria.location_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("categories", yelp_category(criteria.industry)),
            ("location", &location),
            ("limit", &limit),
            ("sort_by", "best_match"),
            ("radius", &radius),
        ];
        if let Some(term) = criteria.business_type.as_deref() {
            params.push(("term", term));
        }

        let response: YelpSearchResponse = retry_with_backoff(
            SOURCE_NAME,
            self.settings.max_retries,
            self.settings.retry_backoff_ms,
            || {
                let request = self.client.get(&url).bearer_auth(api_key).query(&params);
                async move {
                    let resp = request.send().await?;
                    read_json(SOURCE_NAME, "yelp business search", resp).await
                }
            },
        )
        .await?;

        Ok(decode_records::<YelpBusiness>(SOURCE_NAME, response.businesses)
            .into_iter()
            .filter_map(|b| normalize_business(b, criteria.industry))
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for YelpAdapter {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, criteria: &NormalizedCriteria) -> Vec<Lead> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(source = SOURCE_NAME, "YELP_API_KEY not configured, skipping");
            return Vec::new();
        };
        if !criteria.is_us() {
            tracing::debug!(
                source = SOURCE_NAME,
                country = %criteria.country,
                "Yelp only covers US searches, skipping"
            );
            return Vec::new();
        }

        cached_search(SOURCE_NAME, &self.cache, criteria, || self.fetch(api_key, criteria)).await
    }
}

fn normalize_business(business: YelpBusiness, industry: Industry) -> Option<Lead> {
    let name = non_blank(business.name.as_deref())?;
    let url = non_blank(business.url.as_deref());

    let source = LeadSource {
        name: SOURCE_NAME.to_string(),
        source_id: business.id.clone(),
        url: url.clone(),
        collected_at: Utc::now(),
        confidence: SOURCE_ENTRY_CONFIDENCE,
    };

    let mut lead = Lead::new(format!("yelp_{}", business.id), name, industry, source);
    if let Some(title) = business
        .categories
        .first()
        .and_then(|c| non_blank(c.title.as_deref()))
    {
        lead.business_type = title;
    }
    lead.phone = non_blank(business.display_phone.as_deref())
        .or_else(|| non_blank(business.phone.as_deref()));
    lead.website = url;

    let location = business.location;
    lead.address = Address {
        street: location.as_ref().and_then(|l| non_blank(l.address1.as_deref())),
        city: location.as_ref().and_then(|l| non_blank(l.city.as_deref())),
        state: location.as_ref().and_then(|l| non_blank(l.state.as_deref())),
        zip_code: location.as_ref().and_then(|l| non_blank(l.zip_code.as_deref())),
        country: location
            .as_ref()
            .and_then(|l| non_blank(l.country.as_deref()))
            .or_else(|| Some("US".to_string())),
        coordinates: business.coordinates.and_then(|c| match (c.latitude, c.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }),
    };

    let details = &mut lead.business_details;
    details.description = non_blank(business.review_snippet.as_deref());
    details.rating = business.rating;
    details.review_count = business.review_count;
    details.hours = business
        .hours
        .into_iter()
        .next()
        .map(|h| h.open.into_iter().filter_map(to_business_hours).collect())
        .unwrap_or_default();

    lead.confidence = yelp_confidence(&lead);
    Some(lead)
}

fn to_business_hours(slot: YelpOpenSlot) -> Option<BusinessHours> {
    let day = WEEKDAYS.get(slot.day?)?;
    Some(BusinessHours {
        day: (*day).to_string(),
        open: slot.start,
        close: slot.end,
        closed: false,
        raw: None,
    })
}
