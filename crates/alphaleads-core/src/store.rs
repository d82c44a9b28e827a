//! Persistence interface for leads.
//!
//! The pipeline treats storage as an optional sink: every operation here may
//! be absent and generation still works.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::criteria::Industry;
use crate::lead::{Lead, LeadStatus};

pub const DEFAULT_QUERY_LIMIT: usize = 100;
pub const MAX_QUERY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lead store is not configured")]
    Unavailable,

    #[error("lead {0} not found")]
    NotFound(String),

    #[error("lead store backend error: {0}")]
    Backend(String),
}

/// Filters for [`LeadStore::query`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFilters {
    pub industry: Option<Industry>,
    pub status: Option<LeadStatus>,
    /// Case-insensitive substring match on `address.city`.
    pub city: Option<String>,
    /// Case-insensitive substring match on `address.state`.
    pub state: Option<String>,
    pub min_confidence: Option<u8>,
    #[serde(default)]
    pub has_email: bool,
    #[serde(default)]
    pub has_phone: bool,
    pub limit: Option<usize>,
}

impl LeadFilters {
    /// Effective row limit: default 100, clamped to `1..=500`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_QUERY_LIMIT)
            .clamp(1, MAX_QUERY_LIMIT)
    }

    /// In-process evaluation of the filters against a single lead.
    #[must_use]
    pub fn matches(&self, lead: &Lead) -> bool {
        if self.industry.is_some_and(|i| i != lead.industry) {
            return false;
        }
        if self.status.is_some_and(|s| s != lead.status) {
            return false;
        }
        if self.min_confidence.is_some_and(|min| lead.confidence < min) {
            return false;
        }
        if self.has_email && !lead.has_email() {
            return false;
        }
        if self.has_phone && !lead.has_phone() {
            return false;
        }
        contains_ci(lead.address.city.as_deref(), self.city.as_deref())
            && contains_ci(lead.address.state.as_deref(), self.state.as_deref())
    }
}

fn contains_ci(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(needle) => haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase())),
    }
}

/// Durable storage for leads produced by the pipeline.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persists a lead and returns it with the store-assigned id.
    async fn save(&self, lead: &Lead) -> Result<Lead, StoreError>;

    /// Returns leads matching `filters`, highest confidence first, newest
    /// first among equal confidence.
    async fn query(&self, filters: &LeadFilters) -> Result<Vec<Lead>, StoreError>;

    async fn get(&self, id: &str) -> Result<Lead, StoreError>;

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Deletes every listed lead that exists and returns how many were removed.
    async fn delete_many(&self, ids: &[String]) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::lead::LeadSource;

    fn lead(city: Option<&str>, confidence: u8) -> Lead {
        let mut lead = Lead::new(
            "osm_1",
            "Corner Clinic",
            Industry::Healthcare,
            LeadSource {
                name: "openstreetmap".to_string(),
                source_id: "1".to_string(),
                url: None,
                collected_at: Utc::now(),
                confidence: 70,
            },
        );
        lead.address.city = city.map(ToOwned::to_owned);
        lead.confidence = confidence;
        lead
    }

    #[test]
    fn empty_filters_match_everything() {
        assert!(LeadFilters::default().matches(&lead(None, 0)));
    }

    #[test]
    fn city_filter_is_case_insensitive_substring() {
        let filters = LeadFilters {
            city: Some("aust".to_string()),
            ..LeadFilters::default()
        };
        assert!(filters.matches(&lead(Some("Austin"), 50)));
        assert!(!filters.matches(&lead(Some("Dallas"), 50)));
        assert!(!filters.matches(&lead(None, 50)));
    }

    #[test]
    fn min_confidence_and_contact_filters_apply() {
        let filters = LeadFilters {
            min_confidence: Some(60),
            has_phone: true,
            ..LeadFilters::default()
        };
        let mut l = lead(None, 65);
        assert!(!filters.matches(&l), "no phone yet");
        l.phone = Some("+15125550100".to_string());
        assert!(filters.matches(&l));
        l.confidence = 59;
        assert!(!filters.matches(&l));
    }

    #[test]
    fn industry_and_status_filters_apply() {
        let filters = LeadFilters {
            industry: Some(Industry::Legal),
            ..LeadFilters::default()
        };
        assert!(!filters.matches(&lead(None, 50)));

        let filters = LeadFilters {
            status: Some(LeadStatus::Validated),
            ..LeadFilters::default()
        };
        let mut l = lead(None, 80);
        assert!(!filters.matches(&l));
        l.status = LeadStatus::Validated;
        assert!(filters.matches(&l));
    }

    #[test]
    fn effective_limit_defaults_and_clamps() {
        assert_eq!(LeadFilters::default().effective_limit(), 100);
        let filters = LeadFilters {
            limit: Some(0),
            ..LeadFilters::default()
        };
        assert_eq!(filters.effective_limit(), 1);
        let filters = LeadFilters {
            limit: Some(10_000),
            ..LeadFilters::default()
        };
        assert_eq!(filters.effective_limit(), 500);
    }
}
