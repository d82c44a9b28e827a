//! Search criteria accepted by the lead pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 100;
pub const DEFAULT_LIMIT: usize = 50;
pub const DEFAULT_COUNTRY: &str = "usa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    RealEstate,
    Mortgage,
    Insurance,
    Construction,
    PropertyManagement,
    Healthcare,
    Legal,
    Automotive,
    Retail,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 10] = [
        Industry::RealEstate,
        Industry::Mortgage,
        Industry::Insurance,
        Industry::Construction,
        Industry::PropertyManagement,
        Industry::Healthcare,
        Industry::Legal,
        Industry::Automotive,
        Industry::Retail,
        Industry::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Industry::RealEstate => "real-estate",
            Industry::Mortgage => "mortgage",
            Industry::Insurance => "insurance",
            Industry::Construction => "construction",
            Industry::PropertyManagement => "property-management",
            Industry::Healthcare => "healthcare",
            Industry::Legal => "legal",
            Industry::Automotive => "automotive",
            Industry::Retail => "retail",
            Industry::Other => "other",
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Industry {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| CriteriaError::UnknownIndustry(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("limit must be between {MIN_LIMIT} and {MAX_LIMIT}, got {0}")]
    LimitOutOfRange(usize),

    #[error("unknown industry \"{0}\"")]
    UnknownIndustry(String),
}

/// Raw search request, as received from the API or CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub industry: Industry,
    /// Free-form place string; takes precedence over `city`/`state`.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl SearchCriteria {
    #[must_use]
    pub fn new(industry: Industry) -> Self {
        Self {
            industry,
            location: None,
            city: None,
            state: None,
            country: None,
            business_type: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Validates the request and produces the form adapters consume.
    ///
    /// Blank strings become `None`, the country is lowercased and defaults
    /// to `"usa"`.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::LimitOutOfRange`] when `limit` is outside
    /// `1..=100`.
    pub fn normalize(&self) -> Result<NormalizedCriteria, CriteriaError> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.limit) {
            return Err(CriteriaError::LimitOutOfRange(self.limit));
        }

        Ok(NormalizedCriteria {
            industry: self.industry,
            location: clean(self.location.as_deref()),
            city: clean(self.city.as_deref()),
            state: clean(self.state.as_deref()),
            country: clean(self.country.as_deref())
                .map_or_else(|| DEFAULT_COUNTRY.to_string(), |c| c.to_lowercase()),
            business_type: clean(self.business_type.as_deref()),
            limit: self.limit,
        })
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Validated criteria. `limit` is always within `1..=100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCriteria {
    pub industry: Industry,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub business_type: Option<String>,
    pub limit: usize,
}

impl NormalizedCriteria {
    /// Human-readable place string for providers that accept one.
    #[must_use]
    pub fn location_string(&self) -> String {
        if let Some(location) = &self.location {
            return location.clone();
        }
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (Some(city), None) => city.clone(),
            (None, Some(state)) => state.clone(),
            (None, None) => "United States".to_string(),
        }
    }

    /// Returns `true` when a city or free-form location narrows the search
    /// below country level.
    #[must_use]
    pub fn has_locality(&self) -> bool {
        self.location.is_some() || self.city.is_some()
    }

    #[must_use]
    pub fn is_us(&self) -> bool {
        matches!(self.country.as_str(), "usa" | "us" | "united states")
    }

    /// Deterministic key over every field that changes a provider query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.industry,
            self.location.as_deref().unwrap_or_default().to_lowercase(),
            self.city.as_deref().unwrap_or_default().to_lowercase(),
            self.state.as_deref().unwrap_or_default().to_lowercase(),
            self.country,
            self.business_type
                .as_deref()
                .unwrap_or_default()
                .to_lowercase(),
            self.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults() {
        let criteria = SearchCriteria::new(Industry::Legal).normalize().unwrap();
        assert_eq!(criteria.country, "usa");
        assert_eq!(criteria.limit, 50);
        assert_eq!(criteria.location_string(), "United States");
        assert!(criteria.is_us());
    }

    #[test]
    fn normalize_rejects_out_of_range_limits() {
        let mut criteria = SearchCriteria::new(Industry::Legal);
        criteria.limit = 0;
        assert_eq!(
            criteria.normalize(),
            Err(CriteriaError::LimitOutOfRange(0))
        );
        criteria.limit = 101;
        assert_eq!(
            criteria.normalize(),
            Err(CriteriaError::LimitOutOfRange(101))
        );
        criteria.limit = 100;
        assert!(criteria.normalize().is_ok());
    }

    #[test]
    fn normalize_trims_blank_strings_and_lowercases_country() {
        let mut criteria = SearchCriteria::new(Industry::Retail);
        criteria.city = Some("  Dhaka ".to_string());
        criteria.state = Some("   ".to_string());
        criteria.country = Some("BD".to_string());
        let n = criteria.normalize().unwrap();
        assert_eq!(n.city.as_deref(), Some("Dhaka"));
        assert_eq!(n.state, None);
        assert_eq!(n.country, "bd");
        assert!(!n.is_us());
    }

    #[test]
    fn location_string_prefers_free_form_location() {
        let mut criteria = SearchCriteria::new(Industry::Retail);
        criteria.city = Some("Austin".to_string());
        criteria.state = Some("TX".to_string());
        assert_eq!(criteria.normalize().unwrap().location_string(), "Austin, TX");

        criteria.location = Some("Round Rock".to_string());
        assert_eq!(criteria.normalize().unwrap().location_string(), "Round Rock");
    }

    #[test]
    fn cache_key_is_case_insensitive_and_limit_sensitive() {
        let mut a = SearchCriteria::new(Industry::Insurance);
        a.city = Some("Austin".to_string());
        let mut b = a.clone();
        b.city = Some("AUSTIN".to_string());
        assert_eq!(
            a.normalize().unwrap().cache_key(),
            b.normalize().unwrap().cache_key()
        );
        b.limit = 10;
        assert_ne!(
            a.normalize().unwrap().cache_key(),
            b.normalize().unwrap().cache_key()
        );
    }

    #[test]
    fn industry_parses_kebab_case() {
        assert_eq!(
            "property-management".parse::<Industry>(),
            Ok(Industry::PropertyManagement)
        );
        assert!("bakery".parse::<Industry>().is_err());
    }

    #[test]
    fn criteria_deserializes_camel_case_with_defaults() {
        let criteria: SearchCriteria = serde_json::from_str(
            r#"{"industry":"real-estate","city":"Austin","businessType":"realtor"}"#,
        )
        .unwrap();
        assert_eq!(criteria.industry, Industry::RealEstate);
        assert_eq!(criteria.business_type.as_deref(), Some("realtor"));
        assert_eq!(criteria.limit, DEFAULT_LIMIT);
    }
}
