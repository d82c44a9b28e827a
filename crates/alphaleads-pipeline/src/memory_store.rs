use std::cmp::Reverse;

use alphaleads_core::{Lead, LeadFilters, LeadStatus, LeadStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local [`LeadStore`]. Contents are lost on restart.
///
/// Every save assigns a fresh UUID, so saving the same lead twice stores two
/// rows, matching the Postgres store.
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl InMemoryLeadStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn save(&self, lead: &Lead) -> Result<Lead, StoreError> {
        let mut stored = lead.clone();
        stored.id = Uuid::new_v4().to_string();
        self.leads.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn query(&self, filters: &LeadFilters) -> Result<Vec<Lead>, StoreError> {
        let leads = self.leads.read().await;
        let mut matched: Vec<Lead> = leads.iter().filter(|l| filters.matches(l)).cloned().collect();
        matched.sort_by_key(|l| (Reverse(l.confidence), Reverse(l.created_at)));
        matched.truncate(filters.effective_limit());
        Ok(matched)
    }

    async fn get(&self, id: &str) -> Result<Lead, StoreError> {
        self.leads
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, StoreError> {
        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        lead.status = status;
        if status == LeadStatus::Contacted {
            lead.last_contacted_at = Some(Utc::now());
        }
        lead.touch();
        Ok(lead.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        if leads.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, StoreError> {
        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|l| !ids.contains(&l.id));
        Ok(u64::try_from(before - leads.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use alphaleads_core::{Industry, LeadSource};

    use super::*;

    fn lead(name: &str, city: &str, confidence: u8) -> Lead {
        let mut lead = Lead::new(
            format!("test_{name}"),
            name,
            Industry::Healthcare,
            LeadSource {
                name: "test".to_string(),
                source_id: name.to_string(),
                url: None,
                collected_at: Utc::now(),
                confidence: 50,
            },
        );
        lead.address.city = Some(city.to_string());
        lead.confidence = confidence;
        lead
    }

    #[tokio::test]
    async fn save_assigns_a_new_id() {
        let store = InMemoryLeadStore::new();
        let original = lead("Clinic", "Austin", 60);
        let saved = store.save(&original).await.unwrap();
        assert_ne!(saved.id, original.id);
        assert_eq!(saved.business_name, "Clinic");
        assert_eq!(store.get(&saved.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn query_filters_and_sorts_by_confidence() {
        let store = InMemoryLeadStore::new();
        store.save(&lead("Low", "Austin", 40)).await.unwrap();
        store.save(&lead("High", "Austin", 90)).await.unwrap();
        store.save(&lead("Elsewhere", "Dallas", 99)).await.unwrap();
        store.save(&lead("Mid", "north austin", 70)).await.unwrap();

        let filters = LeadFilters {
            city: Some("AUSTIN".to_string()),
            min_confidence: Some(50),
            ..LeadFilters::default()
        };
        let names: Vec<String> = store
            .query(&filters)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.business_name)
            .collect();
        assert_eq!(names, vec!["High", "Mid"]);
    }

    #[tokio::test]
    async fn query_respects_limit() {
        let store = InMemoryLeadStore::new();
        for i in 0..5u8 {
            store.save(&lead(&format!("L{i}"), "Austin", i * 10)).await.unwrap();
        }
        let filters = LeadFilters {
            limit: Some(2),
            ..LeadFilters::default()
        };
        let got = store.query(&filters).await.unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].confidence, 40);
    }

    #[tokio::test]
    async fn update_status_stamps_contacted_time() {
        let store = InMemoryLeadStore::new();
        let saved = store.save(&lead("Clinic", "Austin", 60)).await.unwrap();
        let updated = store.update_status(&saved.id, LeadStatus::Contacted).await.unwrap();
        assert_eq!(updated.status, LeadStatus::Contacted);
        assert!(updated.last_contacted_at.is_some());
        assert!(updated.updated_at >= saved.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = InMemoryLeadStore::new();
        assert!(matches!(store.get("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update_status("nope", LeadStatus::Rejected).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete("nope").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_many_counts_removed_rows() {
        let store = InMemoryLeadStore::new();
        let a = store.save(&lead("A", "Austin", 1)).await.unwrap();
        let b = store.save(&lead("B", "Austin", 2)).await.unwrap();
        store.save(&lead("C", "Austin", 3)).await.unwrap();

        let removed = store
            .delete_many(&[a.id, b.id, "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);
    }
}
