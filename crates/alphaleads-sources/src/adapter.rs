use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alphaleads_core::{AppConfig, Lead, NormalizedCriteria};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::cache::TtlCache;
use crate::error::SourceError;
use crate::osm::OsmAdapter;
use crate::sec::SecEdgarAdapter;
use crate::yelp::YelpAdapter;

/// One external business-data provider.
///
/// `search` never fails: a disabled adapter or a provider error yields an
/// empty list, so one bad provider cannot sink a whole pipeline run.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Provider name recorded in [`alphaleads_core::LeadSource::name`].
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    async fn search(&self, criteria: &NormalizedCriteria) -> Vec<Lead>;
}

/// Knobs shared by every adapter, resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub user_agent: String,
    pub cache_ttl: Duration,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl SourceSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            cache_ttl: Duration::from_secs(config.source_cache_ttl_secs),
            max_retries: config.source_max_retries,
            retry_backoff_ms: config.source_retry_backoff_ms,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            user_agent: "AlphaLeads/1.0 (lead-aggregation)".to_string(),
            cache_ttl: Duration::from_secs(3600),
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

/// Builds every adapter in pipeline order: Yelp, OpenStreetMap, SEC EDGAR.
///
/// Disabled adapters are still returned so source summaries can report them.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if an HTTP client cannot be constructed.
pub fn build_source_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn SourceAdapter>>, SourceError> {
    let settings = SourceSettings::from_app_config(config);
    let yelp = YelpAdapter::new(config.yelp_api_key.clone(), &settings)?;
    let osm = OsmAdapter::new(config.osm_enabled, config.osm_phone_enrichment, &settings)?;
    let sec = SecEdgarAdapter::new(config.sec_enabled, &settings)?;
    Ok(vec![Arc::new(yelp), Arc::new(osm), Arc::new(sec)])
}

/// Cache-then-fetch wrapper used by every adapter's `search`.
///
/// Successful fetches are cached under `criteria.cache_key()`; errors are
/// logged and converted into an empty result, which is not cached.
pub(crate) async fn cached_search<F, Fut>(
    provider: &'static str,
    cache: &TtlCache<Vec<Lead>>,
    criteria: &NormalizedCriteria,
    fetch: F,
) -> Vec<Lead>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Lead>, SourceError>>,
{
    let key = criteria.cache_key();
    if let Some(hit) = cache.get(&key).await {
        tracing::debug!(source = provider, count = hit.len(), "serving leads from cache");
        return hit;
    }

    match fetch().await {
        Ok(leads) => {
            tracing::info!(source = provider, count = leads.len(), "provider search complete");
            cache.insert(key, leads.clone()).await;
            leads
        }
        Err(e) => {
            tracing::warn!(source = provider, error = %e, "provider search failed");
            Vec::new()
        }
    }
}

/// Decodes provider records one at a time so a malformed entry only loses
/// itself.
pub(crate) fn decode_records<T: DeserializeOwned>(
    provider: &'static str,
    records: Vec<serde_json::Value>,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(source = provider, error = %e, "dropping malformed record");
                None
            }
        })
        .collect()
}

/// Returns `None` for missing or whitespace-only provider strings.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
