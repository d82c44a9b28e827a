//! Postgres-backed [`LeadStore`].
//!
//! Each row keeps the full lead as JSONB next to the scalar columns that
//! filters and ordering use. On read the columns win over the payload, so a
//! status change only has to touch the columns.

use alphaleads_core::{Industry, Lead, LeadFilters, LeadStatus, LeadStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const LEAD_COLUMNS: &str = "public_id, status, confidence, payload, \
                            created_at, updated_at, last_contacted_at";

/// A row from the `leads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub public_id: Uuid,
    pub status: String,
    pub confidence: i16,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_contacted_at: Option<DateTime<Utc>>,
}

impl LeadRow {
    /// Decodes the payload and overlays the authoritative columns.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Payload`] if the JSONB payload is not a lead.
    pub fn into_lead(self) -> Result<Lead, DbError> {
        let mut lead: Lead = serde_json::from_value(self.payload)?;
        lead.id = self.public_id.to_string();
        if let Some(status) = LeadStatus::parse(&self.status) {
            lead.status = status;
        }
        lead.confidence = u8::try_from(self.confidence.clamp(0, 100)).unwrap_or_default();
        lead.created_at = self.created_at;
        lead.updated_at = self.updated_at;
        lead.last_contacted_at = self.last_contacted_at;
        Ok(lead)
    }
}

fn parse_id(id: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(id.trim()).map_err(|_| DbError::InvalidId(id.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Inserts `lead` under a fresh public id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::Payload`] if
/// the lead cannot be encoded.
pub async fn insert_lead(pool: &PgPool, lead: &Lead) -> Result<LeadRow, DbError> {
    let public_id = Uuid::new_v4();
    let mut stored = lead.clone();
    stored.id = public_id.to_string();
    let payload = serde_json::to_value(&stored)?;

    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "INSERT INTO leads \
             (public_id, business_name, industry, status, city, state, confidence, \
              has_email, has_phone, payload, created_at, updated_at, last_contacted_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(public_id)
    .bind(&stored.business_name)
    .bind(stored.industry.as_str())
    .bind(stored.status.as_str())
    .bind(stored.address.city.as_deref())
    .bind(stored.address.state.as_deref())
    .bind(i16::from(stored.confidence))
    .bind(stored.has_email())
    .bind(stored.has_phone())
    .bind(payload)
    .bind(stored.created_at)
    .bind(stored.updated_at)
    .bind(stored.last_contacted_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Lists leads matching `filters`, highest confidence first, newest first
/// among ties.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_leads(pool: &PgPool, filters: &LeadFilters) -> Result<Vec<LeadRow>, DbError> {
    let limit = i64::try_from(filters.effective_limit()).unwrap_or(i64::MAX);

    let rows = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {LEAD_COLUMNS} \
         FROM leads \
         WHERE ($1::TEXT IS NULL OR industry = $1) \
           AND ($2::TEXT IS NULL OR status = $2) \
           AND ($3::TEXT IS NULL OR strpos(lower(city), lower($3)) > 0) \
           AND ($4::TEXT IS NULL OR strpos(lower(state), lower($4)) > 0) \
           AND ($5::SMALLINT IS NULL OR confidence >= $5) \
           AND (NOT $6 OR has_email) \
           AND (NOT $7 OR has_phone) \
         ORDER BY confidence DESC, created_at DESC \
         LIMIT $8"
    ))
    .bind(filters.industry.map(Industry::as_str))
    .bind(filters.status.map(LeadStatus::as_str))
    .bind(non_blank(filters.city.as_deref()))
    .bind(non_blank(filters.state.as_deref()))
    .bind(filters.min_confidence.map(i16::from))
    .bind(filters.has_email)
    .bind(filters.has_phone)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the lead with the given public id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_lead(pool: &PgPool, public_id: Uuid) -> Result<Option<LeadRow>, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Sets the status and bumps `updated_at`. Moving to `contacted` also stamps
/// `last_contacted_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_lead_status(
    pool: &PgPool,
    public_id: Uuid,
    status: LeadStatus,
) -> Result<Option<LeadRow>, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "UPDATE leads \
         SET status = $2, \
             updated_at = NOW(), \
             last_contacted_at = CASE WHEN $2 = 'contacted' THEN NOW() ELSE last_contacted_at END \
         WHERE public_id = $1 \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(public_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes every listed lead, returning the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_leads(pool: &PgPool, public_ids: &[Uuid]) -> Result<u64, DbError> {
    if public_ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query("DELETE FROM leads WHERE public_id = ANY($1)")
        .bind(public_ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

fn into_store_error(error: DbError) -> StoreError {
    match error {
        DbError::NotFound(id) | DbError::InvalidId(id) => StoreError::NotFound(id),
        other => {
            tracing::warn!(error = %other, "lead store operation failed");
            StoreError::Backend(other.to_string())
        }
    }
}

/// [`LeadStore`] over a Postgres pool. Ids are UUIDs assigned on save.
#[derive(Debug, Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch(&self, id: &str) -> Result<Lead, DbError> {
        let public_id = parse_id(id)?;
        get_lead(&self.pool, public_id)
            .await?
            .ok_or_else(|| DbError::NotFound(id.to_string()))?
            .into_lead()
    }

    async fn insert(&self, lead: &Lead) -> Result<Lead, DbError> {
        insert_lead(&self.pool, lead).await?.into_lead()
    }

    async fn list(&self, filters: &LeadFilters) -> Result<Vec<Lead>, DbError> {
        list_leads(&self.pool, filters)
            .await?
            .into_iter()
            .map(LeadRow::into_lead)
            .collect()
    }

    async fn set_status(&self, id: &str, status: LeadStatus) -> Result<Lead, DbError> {
        let public_id = parse_id(id)?;
        update_lead_status(&self.pool, public_id, status)
            .await?
            .ok_or_else(|| DbError::NotFound(id.to_string()))?
            .into_lead()
    }

    async fn remove(&self, id: &str) -> Result<(), DbError> {
        let public_id = parse_id(id)?;
        match delete_leads(&self.pool, &[public_id]).await? {
            0 => Err(DbError::NotFound(id.to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn save(&self, lead: &Lead) -> Result<Lead, StoreError> {
        self.insert(lead).await.map_err(into_store_error)
    }

    async fn query(&self, filters: &LeadFilters) -> Result<Vec<Lead>, StoreError> {
        self.list(filters).await.map_err(into_store_error)
    }

    async fn get(&self, id: &str) -> Result<Lead, StoreError> {
        self.fetch(id).await.map_err(into_store_error)
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, StoreError> {
        self.set_status(id, status).await.map_err(into_store_error)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.remove(id).await.map_err(into_store_error)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, StoreError> {
        // Ids that are not UUIDs cannot exist, so they simply count as misses.
        let public_ids: Vec<Uuid> = ids.iter().filter_map(|id| parse_id(id).ok()).collect();
        delete_leads(&self.pool, &public_ids)
            .await
            .map_err(into_store_error)
    }
}

#[cfg(test)]
mod tests {
    use alphaleads_core::LeadSource;

    use super::*;

    fn stored_row(payload: Value) -> LeadRow {
        LeadRow {
            public_id: Uuid::nil(),
            status: "contacted".to_string(),
            confidence: 77,
            payload,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            last_contacted_at: Some(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    fn lead() -> Lead {
        Lead::new(
            "yelp_abc",
            "Corner Clinic",
            Industry::Healthcare,
            LeadSource {
                name: "yelp".to_string(),
                source_id: "abc".to_string(),
                url: None,
                collected_at: Utc::now(),
                confidence: 90,
            },
        )
    }

    #[test]
    fn columns_override_payload() {
        let row = stored_row(serde_json::to_value(lead()).unwrap());
        let lead = row.into_lead().unwrap();

        assert_eq!(lead.id, Uuid::nil().to_string());
        assert_eq!(lead.business_name, "Corner Clinic");
        assert_eq!(lead.status, LeadStatus::Contacted);
        assert_eq!(lead.confidence, 77);
        assert_eq!(lead.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(lead.last_contacted_at.is_some());
    }

    #[test]
    fn unknown_status_column_keeps_payload_status() {
        let mut row = stored_row(serde_json::to_value(lead()).unwrap());
        row.status = "archived".to_string();
        assert_eq!(row.into_lead().unwrap().status, LeadStatus::New);
    }

    #[test]
    fn corrupt_payload_is_a_payload_error() {
        let row = stored_row(serde_json::json!({ "businessName": 42 }));
        assert!(matches!(row.into_lead(), Err(DbError::Payload(_))));
    }

    #[test]
    fn non_uuid_ids_map_to_not_found() {
        let err = into_store_error(parse_id("yelp_abc").unwrap_err());
        assert!(matches!(err, StoreError::NotFound(id) if id == "yelp_abc"));
    }

    #[test]
    fn blank_filter_strings_are_ignored() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Austin ")), Some("Austin"));
    }
}
