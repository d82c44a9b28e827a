use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::criteria::Industry;

/// Lifecycle status of a lead.
///
/// The pipeline only ever produces `New` or `Validated`; the remaining states
/// are set by downstream callers (dashboard, CRM export).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Validated,
    Contacted,
    Qualified,
    Converted,
    Rejected,
}

impl LeadStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::Validated,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Rejected,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Validated => "validated",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Rejected => "rejected",
        }
    }

    /// Parse a lowercase status name. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl Address {
    /// Returns `true` when a non-blank street line is present.
    #[must_use]
    pub fn has_street(&self) -> bool {
        self.street.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// One opening-hours entry.
///
/// Structured providers fill `open`/`close` (`"0900"`); free-form providers
/// put the raw `opening_hours` value in `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub day: String,
    pub open: Option<String>,
    pub close: Option<String>,
    #[serde(default)]
    pub closed: bool,
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    pub description: Option<String>,
    pub year_established: Option<i32>,
    pub employee_count: Option<String>,
    pub revenue: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    #[serde(default)]
    pub hours: Vec<BusinessHours>,
}

/// Provenance entry: which provider contributed to a lead and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSource {
    /// Source name, e.g. `"yelp"`, `"openstreetmap"`, `"sec_edgar"`.
    pub name: String,
    /// Provider-native identifier.
    pub source_id: String,
    pub url: Option<String>,
    pub collected_at: DateTime<Utc>,
    /// Provider-level trust in the record, 0-100.
    pub confidence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailValidation {
    pub valid: bool,
    pub deliverable: bool,
    pub risk: EmailRisk,
    /// Verifier score (0-100) when an external verifier answered.
    pub score: Option<u8>,
    /// Number of public sources the verifier found the address on.
    pub sources: Option<u32>,
}

impl EmailValidation {
    /// Result for a missing or malformed address.
    #[must_use]
    pub fn rejected() -> Self {
        Self {
            valid: false,
            deliverable: false,
            risk: EmailRisk::High,
            score: None,
            sources: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneType {
    Mobile,
    Landline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneValidation {
    pub valid: bool,
    /// E.164 rendering, e.g. `"+13105551234"`.
    pub formatted: Option<String>,
    #[serde(rename = "type")]
    pub phone_type: Option<PhoneType>,
    pub carrier: Option<String>,
}

impl PhoneValidation {
    /// Result for a missing or unparseable number.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            valid: false,
            formatted: None,
            phone_type: None,
            carrier: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHandles {
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessValidation {
    pub exists: bool,
    pub verified: bool,
    pub years_in_business: Option<i32>,
    pub employee_count: Option<u64>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub social_media: Option<SocialHandles>,
}

impl BusinessValidation {
    /// Optimistic default used when no enrichment is possible: a missing
    /// lookup is not evidence that the business does not exist.
    #[must_use]
    pub fn unverified() -> Self {
        Self {
            exists: true,
            verified: false,
            years_in_business: None,
            employee_count: None,
            industry: None,
            description: None,
            logo: None,
            social_media: None,
        }
    }
}

/// Per-field results of the validation stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatus {
    pub email: Option<EmailValidation>,
    pub phone: Option<PhoneValidation>,
    pub business: Option<BusinessValidation>,
}

/// Canonical business-contact record produced by the aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// `"<source>_<providerNativeId>"`, unique within one pipeline run.
    pub id: String,
    pub business_name: String,
    pub business_type: String,
    pub industry: Industry,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub business_details: BusinessDetails,
    pub sources: Vec<LeadSource>,
    pub confidence: u8,
    #[serde(default)]
    pub status: LeadStatus,
    pub validation_status: Option<ValidationStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_contacted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Lead {
    /// Creates a lead with a single provenance entry and every optional field
    /// empty. Adapters fill in the rest.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        business_name: impl Into<String>,
        industry: Industry,
        source: LeadSource,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            business_name: business_name.into(),
            business_type: "Business".to_string(),
            industry,
            contact_name: None,
            phone: None,
            email: None,
            website: None,
            address: Address::default(),
            business_details: BusinessDetails::default(),
            sources: vec![source],
            confidence: 0,
            status: LeadStatus::New,
            validation_status: None,
            created_at: now,
            updated_at: now,
            last_contacted_at: None,
            tags: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Bumps `updated_at`. Call after every mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn has_phone(&self) -> bool {
        non_blank(self.phone.as_deref())
    }

    #[must_use]
    pub fn has_email(&self) -> bool {
        non_blank(self.email.as_deref())
    }

    #[must_use]
    pub fn has_website(&self) -> bool {
        non_blank(self.website.as_deref())
    }

    /// Name of the provider that first produced this lead.
    #[must_use]
    pub fn primary_source(&self) -> Option<&str> {
        self.sources.first().map(|s| s.name.as_str())
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> LeadSource {
        LeadSource {
            name: "yelp".to_string(),
            source_id: "abc".to_string(),
            url: None,
            collected_at: Utc::now(),
            confidence: 90,
        }
    }

    #[test]
    fn new_lead_starts_with_one_source_and_new_status() {
        let lead = Lead::new("yelp_abc", "Acme Realty", Industry::RealEstate, source());
        assert_eq!(lead.sources.len(), 1);
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.primary_source(), Some("yelp"));
        assert!(lead.tags.is_empty() && lead.notes.is_empty());
    }

    #[test]
    fn blank_contact_fields_do_not_count_as_present() {
        let mut lead = Lead::new("yelp_abc", "Acme", Industry::Other, source());
        lead.phone = Some("   ".to_string());
        lead.email = Some(String::new());
        assert!(!lead.has_phone());
        assert!(!lead.has_email());
        lead.website = Some("https://acme.example".to_string());
        assert!(lead.has_website());
    }

    #[test]
    fn lead_serializes_with_camel_case_keys() {
        let lead = Lead::new("yelp_abc", "Acme", Industry::PropertyManagement, source());
        let json = serde_json::to_value(&lead).expect("serialize");
        assert_eq!(json["businessName"], "Acme");
        assert_eq!(json["industry"], "property-management");
        assert_eq!(json["status"], "new");
        assert!(json["sources"][0]["collectedAt"].is_string());
    }

    #[test]
    fn status_parse_round_trips_known_values() {
        for status in LeadStatus::ALL {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeadStatus::parse("Contacted"), Some(LeadStatus::Contacted));
        assert_eq!(LeadStatus::parse("archived"), None);
    }

    #[test]
    fn phone_type_serializes_under_type_key() {
        let v = PhoneValidation {
            valid: true,
            formatted: Some("+13105550100".to_string()),
            phone_type: Some(PhoneType::Mobile),
            carrier: Some("Unknown".to_string()),
        };
        let json = serde_json::to_value(&v).expect("serialize");
        assert_eq!(json["type"], "mobile");
    }
}
