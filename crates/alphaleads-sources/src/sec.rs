//! SEC EDGAR company tickers: public companies, no contact data.

use std::collections::HashMap;
use std::time::Duration;

use alphaleads_core::{Address, Industry, Lead, LeadSource, NormalizedCriteria};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::adapter::{cached_search, non_blank, SourceAdapter, SourceSettings};
use crate::cache::TtlCache;
use crate::error::SourceError;
use crate::http::{build_client, normalize_base_url, read_json};
use crate::retry::retry_with_backoff;

pub const SOURCE_NAME: &str = "sec_edgar";

/// Filings carry no contact signals, so every record scores the same.
pub const SEC_CONFIDENCE: u8 = 85;

const DEFAULT_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Deserialize)]
struct SecCompany {
    cik_str: u64,
    title: String,
}

pub struct SecEdgarAdapter {
    client: reqwest::Client,
    tickers_url: String,
    enabled: bool,
    settings: SourceSettings,
    cache: TtlCache<Vec<Lead>>,
}

impl SecEdgarAdapter {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(enabled: bool, settings: &SourceSettings) -> Result<Self, SourceError> {
        Self::with_base_url(enabled, settings, DEFAULT_TICKERS_URL)
    }

    /// `tickers_url` is the full URL of the `company_tickers.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for a malformed URL or
    /// [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        enabled: bool,
        settings: &SourceSettings,
        tickers_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT, &settings.user_agent)?,
            tickers_url: normalize_base_url(tickers_url)?,
            enabled,
            settings: settings.clone(),
            cache: TtlCache::new(settings.cache_ttl),
        })
    }

    async fn fetch(&self, criteria: &NormalizedCriteria) -> Result<Vec<Lead>, SourceError> {
        let tickers: HashMap<String, SecCompany> = retry_with_backoff(
            SOURCE_NAME,
            self.settings.max_retries,
            self.settings.retry_backoff_ms,
            || {
                let request = self.client.get(&self.tickers_url);
                async move {
                    let resp = request.send().await?;
                    read_json(SOURCE_NAME, "sec company tickers", resp).await
                }
            },
        )
        .await?;

        let companies = ranked(tickers);
        let needle = criteria.business_type.as_deref().map(str::to_lowercase);
        Ok(companies
            .into_iter()
            .filter(|c| {
                needle
                    .as_deref()
                    .map_or(true, |n| c.title.to_lowercase().contains(n))
            })
            .filter_map(|c| normalize_company(&c, criteria.industry))
            .take(criteria.limit)
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for SecEdgarAdapter {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn search(&self, criteria: &NormalizedCriteria) -> Vec<Lead> {
        if !self.enabled {
            tracing::debug!(source = SOURCE_NAME, "SEC EDGAR disabled by configuration");
            return Vec::new();
        }
        cached_search(SOURCE_NAME, &self.cache, criteria, || self.fetch(criteria)).await
    }
}

/// The tickers document is an object keyed `"0"`, `"1"`, … in market-cap
/// order; restore that order.
fn ranked(tickers: HashMap<String, SecCompany>) -> Vec<SecCompany> {
    let mut entries: Vec<(u64, SecCompany)> = tickers
        .into_iter()
        .map(|(k, v)| (k.parse().unwrap_or(u64::MAX), v))
        .collect();
    entries.sort_by_key(|(rank, _)| *rank);
    entries.into_iter().map(|(_, c)| c).collect()
}

/// Entries with a blank title yield `None`.
fn normalize_company(company: &SecCompany, industry: Industry) -> Option<Lead> {
    let name = non_blank(Some(company.title.as_str()))?;
    let browse_url = format!(
        "https://www.sec.gov/cgi-bin/browse-edgar?CIK={}",
        company.cik_str
    );
    let source = LeadSource {
        name: SOURCE_NAME.to_string(),
        source_id: company.cik_str.to_string(),
        url: Some(browse_url.clone()),
        collected_at: Utc::now(),
        confidence: SEC_CONFIDENCE,
    };

    let mut lead = Lead::new(
        format!("sec_{}", company.cik_str),
        name,
        industry,
        source,
    );
    lead.business_type = "Public Company".to_string();
    lead.website = Some(browse_url);
    lead.address = Address {
        country: Some("US".to_string()),
        ..Address::default()
    };
    lead.business_details.description =
        Some(format!("Public company - SEC CIK: {}", company.cik_str));
    lead.confidence = SEC_CONFIDENCE;
    Some(lead)
}
