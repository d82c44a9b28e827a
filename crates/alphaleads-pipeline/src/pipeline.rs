//! Lead generation orchestrator.
//!
//! Fans criteria out to every enabled [`SourceAdapter`] concurrently, then
//! dedupes, validates, describes, ranks and optionally persists the merged
//! result. A failing, panicking or slow adapter only loses its own leads.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use alphaleads_core::{
    AppConfig, Lead, LeadFilters, LeadStore, NormalizedCriteria, SearchCriteria, StoreError,
};
use alphaleads_sources::{build_source_adapters, SourceAdapter, SourceError};
use alphaleads_validation::{LeadValidator, ValidationError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;

use crate::dedupe::dedupe;

pub const NO_LEADS_MESSAGE: &str = "No leads found from configured data sources";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source setup failed: {0}")]
    Source(#[from] SourceError),

    #[error("validator setup failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Optional stage that writes a short marketing description for a lead.
#[async_trait]
pub trait LeadDescriber: Send + Sync {
    /// `None` keeps the lead's existing description.
    async fn describe(&self, lead: &Lead) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Deadline for a single adapter's search, including retries.
    pub adapter_timeout: Duration,
    pub validation_batch_size: usize,
    pub validation_batch_delay: Duration,
    pub describe_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(45),
            validation_batch_size: 3,
            validation_batch_delay: Duration::from_millis(500),
            describe_timeout: Duration::from_secs(10),
        }
    }
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            validation_batch_size: config.validation_batch_size.max(1),
            validation_batch_delay: Duration::from_millis(config.validation_batch_delay_ms),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    /// Leads per provider, counted over every provenance entry.
    pub by_source: BTreeMap<String, usize>,
    pub total_enabled_providers: usize,
    pub average_confidence: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub success: bool,
    pub total: usize,
    pub leads: Vec<Lead>,
    pub sources: SourceSummary,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct LeadPipeline {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    validator: Option<Arc<LeadValidator>>,
    describer: Option<Arc<dyn LeadDescriber>>,
    store: Option<Arc<dyn LeadStore>>,
    settings: PipelineSettings,
}

impl LeadPipeline {
    /// A pipeline over `adapters` with no validation, describer or store.
    #[must_use]
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, settings: PipelineSettings) -> Self {
        Self {
            adapters,
            validator: None,
            describer: None,
            store: None,
            settings,
        }
    }

    /// Builds every adapter from config and attaches a validator when
    /// validation is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an adapter or validator HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let adapters = build_source_adapters(config)?;
        let mut pipeline = Self::new(adapters, PipelineSettings::from_app_config(config));
        if config.validation_enabled {
            pipeline = pipeline.with_validator(Arc::new(LeadValidator::from_config(config)?));
        }
        Ok(pipeline)
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<LeadValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn without_validation(mut self) -> Self {
        self.validator = None;
        self
    }

    #[must_use]
    pub fn with_describer(mut self, describer: Arc<dyn LeadDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn LeadStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn store(&self) -> Option<&Arc<dyn LeadStore>> {
        self.store.as_ref()
    }

    #[must_use]
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    /// Names of adapters that will be queried.
    #[must_use]
    pub fn enabled_providers(&self) -> Vec<&'static str> {
        self.adapters
            .iter()
            .filter(|a| a.is_enabled())
            .map(|a| a.name())
            .collect()
    }

    /// Runs a full generation: collect, persist when a store is attached,
    /// and summarise.
    pub async fn generate_leads(&self, criteria: &SearchCriteria) -> PipelineResult {
        let enabled = self.enabled_providers().len();

        let normalized = match criteria.normalize() {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!(error = %e, "rejected search criteria");
                return PipelineResult {
                    success: false,
                    total: 0,
                    leads: Vec::new(),
                    sources: SourceSummary {
                        total_enabled_providers: enabled,
                        ..SourceSummary::default()
                    },
                    timestamp: Utc::now(),
                    message: None,
                    error: Some(e.to_string()),
                };
            }
        };

        tracing::info!(
            industry = %normalized.industry,
            location = %normalized.location_string(),
            country = %normalized.country,
            limit = normalized.limit,
            providers = enabled,
            "generating leads"
        );

        let leads = self.collect(&normalized).await;
        let leads = self.persist(leads).await;

        let message = leads.is_empty().then(|| NO_LEADS_MESSAGE.to_string());
        let sources = summarize(&leads, enabled);
        tracing::info!(
            total = leads.len(),
            average_confidence = sources.average_confidence,
            "lead generation complete"
        );

        PipelineResult {
            success: true,
            total: leads.len(),
            leads,
            sources,
            timestamp: Utc::now(),
            message,
            error: None,
        }
    }

    /// Fan-out, dedupe, validation, description, ranking and truncation.
    /// Never touches the store.
    pub async fn collect(&self, criteria: &NormalizedCriteria) -> Vec<Lead> {
        let raw = self.fan_out(criteria).await;
        let raw_count = raw.len();
        let mut leads = dedupe(raw);
        tracing::debug!(raw = raw_count, unique = leads.len(), "deduplicated leads");

        if let Some(validator) = &self.validator {
            leads = self.validate_in_batches(validator, leads).await;
        }
        if let Some(describer) = &self.describer {
            leads = self.describe_all(describer.as_ref(), leads).await;
        }

        leads.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        leads.truncate(criteria.limit);
        leads
    }

    /// Passes through to the attached store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when no store is attached, or the
    /// store's own error.
    pub async fn get_leads(&self, filters: &LeadFilters) -> Result<Vec<Lead>, StoreError> {
        match &self.store {
            Some(store) => store.query(filters).await,
            None => Err(StoreError::Unavailable),
        }
    }

    async fn fan_out(&self, criteria: &NormalizedCriteria) -> Vec<Lead> {
        let deadline = self.settings.adapter_timeout;
        let (names, handles): (Vec<&'static str>, Vec<_>) = self
            .adapters
            .iter()
            .filter(|a| a.is_enabled())
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let criteria = criteria.clone();
                let name = adapter.name();
                let handle = tokio::spawn(async move {
                    tokio::time::timeout(deadline, adapter.search(&criteria)).await
                });
                (name, handle)
            })
            .unzip();

        let mut merged = Vec::new();
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(leads)) => {
                    tracing::debug!(source = name, count = leads.len(), "adapter finished");
                    merged.extend(leads);
                }
                Ok(Err(_elapsed)) => {
                    tracing::warn!(
                        source = name,
                        timeout_secs = deadline.as_secs(),
                        "adapter timed out, dropping its results"
                    );
                }
                Err(e) => {
                    tracing::warn!(source = name, error = %e, "adapter task failed, dropping its results");
                }
            }
        }
        merged
    }

    async fn validate_in_batches(&self, validator: &LeadValidator, leads: Vec<Lead>) -> Vec<Lead> {
        let batch_size = self.settings.validation_batch_size.max(1);
        let mut validated = Vec::with_capacity(leads.len());
        let mut remaining = leads.into_iter();
        let mut first = true;

        loop {
            let batch: Vec<Lead> = remaining.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            if !first {
                tokio::time::sleep(self.settings.validation_batch_delay).await;
            }
            first = false;
            validated.extend(join_all(batch.into_iter().map(|l| validator.validate_lead(l))).await);
        }
        validated
    }

    async fn describe_all(&self, describer: &dyn LeadDescriber, leads: Vec<Lead>) -> Vec<Lead> {
        let deadline = self.settings.describe_timeout;
        join_all(leads.into_iter().map(|mut lead| async move {
            let described = tokio::time::timeout(deadline, describer.describe(&lead)).await;
            match described {
                Ok(Some(description)) => {
                    lead.business_details.description = Some(description);
                    lead.touch();
                }
                Ok(None) => {}
                Err(_) => {
                    tracing::warn!(lead_id = %lead.id, "describer timed out");
                }
            }
            lead
        }))
        .await
    }

    /// Saves each lead best-effort, returning stored copies where saves
    /// succeed and the original otherwise.
    async fn persist(&self, leads: Vec<Lead>) -> Vec<Lead> {
        let Some(store) = &self.store else {
            return leads;
        };
        let mut out = Vec::with_capacity(leads.len());
        for lead in leads {
            match store.save(&lead).await {
                Ok(saved) => out.push(saved),
                Err(e) => {
                    tracing::warn!(lead_id = %lead.id, error = %e, "failed to save lead");
                    out.push(lead);
                }
            }
        }
        out
    }
}

/// Per-source counts, enabled provider count and rounded mean confidence.
#[must_use]
pub fn summarize(leads: &[Lead], total_enabled_providers: usize) -> SourceSummary {
    let mut by_source = BTreeMap::new();
    for source in leads.iter().flat_map(|l| &l.sources) {
        *by_source.entry(source.name.clone()).or_insert(0) += 1;
    }

    let average_confidence = if leads.is_empty() {
        0
    } else {
        let sum: usize = leads.iter().map(|l| usize::from(l.confidence)).sum();
        let n = leads.len();
        u8::try_from((sum + n / 2) / n).unwrap_or(100)
    };

    SourceSummary {
        by_source,
        total_enabled_providers,
        average_confidence,
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
