//! Company verification through Clearbit.

use std::time::Duration;

use alphaleads_core::{BusinessValidation, SocialHandles};
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ValidationError;
use crate::http::{build_client, read_json};

const COMPANY_BASE_URL: &str = "https://company.clearbit.com/v2";
const AUTOCOMPLETE_BASE_URL: &str = "https://autocomplete.clearbit.com/v1";
const CLEARBIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Company data returned by an enrichment service. Every field is optional;
/// a profile with a name counts as a verified business.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub founded_year: Option<i32>,
    pub metrics: Option<CompanyMetrics>,
    pub category: Option<CompanyCategory>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub facebook: Option<SocialHandle>,
    pub linkedin: Option<SocialHandle>,
    pub twitter: Option<SocialHandle>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyMetrics {
    pub employees: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyCategory {
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SocialHandle {
    pub handle: Option<String>,
}

impl CompanyProfile {
    /// Converts to the lead-facing shape. `current_year` feeds years in
    /// business.
    #[must_use]
    pub fn into_validation(self, current_year: i32) -> BusinessValidation {
        let verified = self.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        let handle = |h: Option<SocialHandle>| h.and_then(|h| h.handle);
        let social = SocialHandles {
            facebook: handle(self.facebook),
            linkedin: handle(self.linkedin),
            twitter: handle(self.twitter),
        };
        let has_social =
            social.facebook.is_some() || social.linkedin.is_some() || social.twitter.is_some();

        BusinessValidation {
            exists: true,
            verified,
            years_in_business: self.founded_year.map(|y| current_year - y),
            employee_count: self.metrics.and_then(|m| m.employees),
            industry: self.category.and_then(|c| c.industry),
            description: self.description,
            logo: self.logo,
            social_media: has_social.then_some(social),
        }
    }
}

/// Looks a business up by domain when one is known, otherwise by name.
#[async_trait]
pub trait BusinessEnricher: Send + Sync {
    /// `Ok(None)` means the service answered but knows no such company.
    async fn enrich(
        &self,
        name: &str,
        domain: Option<&str>,
    ) -> Result<Option<CompanyProfile>, ValidationError>;
}

/// Host of `website` with any `www.` prefix removed.
///
/// Bare hosts without a scheme are accepted.
#[must_use]
pub fn extract_domain(website: &str) -> Option<String> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = reqwest::Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Clearbit Company (`/companies/find`) and Autocomplete
/// (`/companies/suggest`) client.
pub struct ClearbitClient {
    client: reqwest::Client,
    api_key: String,
    company_base_url: String,
    autocomplete_base_url: String,
}

impl ClearbitClient {
    /// # Errors
    ///
    /// Returns [`ValidationError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_base_urls(api_key, COMPANY_BASE_URL, AUTOCOMPLETE_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::Http`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        api_key: impl Into<String>,
        company_base_url: &str,
        autocomplete_base_url: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            client: build_client(CLEARBIT_TIMEOUT)?,
            api_key: api_key.into(),
            company_base_url: company_base_url.trim_end_matches('/').to_string(),
            autocomplete_base_url: autocomplete_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<CompanyProfile>, ValidationError> {
        let resp = self
            .client
            .get(format!("{}/companies/find", self.company_base_url))
            .bearer_auth(&self.api_key)
            .query(&[("domain", domain)])
            .send()
            .await?;
        // 404: unknown company. 202: lookup queued, nothing to return yet.
        if matches!(resp.status().as_u16(), 404 | 202) {
            return Ok(None);
        }
        read_json("clearbit", "clearbit company find", resp)
            .await
            .map(Some)
    }

    async fn suggest_by_name(&self, name: &str) -> Result<Option<CompanyProfile>, ValidationError> {
        let resp = self
            .client
            .get(format!("{}/companies/suggest", self.autocomplete_base_url))
            .bearer_auth(&self.api_key)
            .query(&[("query", name)])
            .send()
            .await?;
        let suggestions: Vec<CompanyProfile> =
            read_json("clearbit", "clearbit company suggest", resp).await?;
        Ok(suggestions.into_iter().next())
    }
}

#[async_trait]
impl BusinessEnricher for ClearbitClient {
    async fn enrich(
        &self,
        name: &str,
        domain: Option<&str>,
    ) -> Result<Option<CompanyProfile>, ValidationError> {
        match domain {
            Some(domain) => self.find_by_domain(domain).await,
            None => self.suggest_by_name(name).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_domain_strips_www_and_path() {
        assert_eq!(
            extract_domain("https://www.Acme.io/about?x=1").as_deref(),
            Some("acme.io")
        );
        assert_eq!(extract_domain("acme.io").as_deref(), Some("acme.io"));
        assert_eq!(
            extract_domain("http://shop.acme.io").as_deref(),
            Some("shop.acme.io")
        );
        assert_eq!(extract_domain("   "), None);
    }

    #[test]
    fn profile_with_name_is_verified() {
        let profile: CompanyProfile = serde_json::from_value(serde_json::json!({
            "name": "Acme",
            "foundedYear": 2010,
            "metrics": { "employees": 120 },
            "category": { "industry": "Real Estate" },
            "linkedin": { "handle": "company/acme" },
            "twitter": { "handle": null }
        }))
        .unwrap();
        let v = profile.into_validation(2026);
        assert!(v.exists && v.verified);
        assert_eq!(v.years_in_business, Some(16));
        assert_eq!(v.employee_count, Some(120));
        assert_eq!(v.industry.as_deref(), Some("Real Estate"));
        let social = v.social_media.unwrap();
        assert_eq!(social.linkedin.as_deref(), Some("company/acme"));
        assert!(social.twitter.is_none());
    }

    #[test]
    fn profile_without_name_is_unverified() {
        let v = CompanyProfile::default().into_validation(2026);
        assert!(v.exists);
        assert!(!v.verified);
        assert!(v.social_media.is_none());
    }
}
