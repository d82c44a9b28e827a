//! Email syntax checks, the Hunter.io verifier and the offline heuristic.

use std::sync::LazyLock;
use std::time::Duration;

use alphaleads_core::{EmailRisk, EmailValidation};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::error::ValidationError;
use crate::http::{build_client, read_json};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const FREE_MAIL_DOMAINS: [&str; 5] = [
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
];

const HUNTER_BASE_URL: &str = "https://api.hunter.io/v2";
const HUNTER_TIMEOUT: Duration = Duration::from_secs(10);

/// Verdict returned by an email verification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailVerdict {
    Deliverable,
    Risky,
    Undeliverable,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailVerification {
    pub result: EmailVerdict,
    pub score: Option<u8>,
    pub sources: u32,
}

/// External deliverability check for a syntactically valid address.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn verify(&self, email: &str) -> Result<EmailVerification, ValidationError>;
}

#[must_use]
pub fn is_well_formed(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Offline assessment: free-mail domains are low risk, everything else
/// medium. Callers must check syntax first.
#[must_use]
pub fn heuristic_email(email: &str) -> EmailValidation {
    let domain = email
        .rsplit_once('@')
        .map(|(_, d)| d.to_lowercase())
        .unwrap_or_default();
    let risk = if FREE_MAIL_DOMAINS.contains(&domain.as_str()) {
        EmailRisk::Low
    } else {
        EmailRisk::Medium
    };
    EmailValidation {
        valid: true,
        deliverable: true,
        risk,
        score: None,
        sources: None,
    }
}

impl From<EmailVerification> for EmailValidation {
    fn from(v: EmailVerification) -> Self {
        let risk = match v.result {
            EmailVerdict::Deliverable => EmailRisk::Low,
            EmailVerdict::Risky | EmailVerdict::Unknown => EmailRisk::Medium,
            EmailVerdict::Undeliverable => EmailRisk::High,
        };
        Self {
            valid: v.result != EmailVerdict::Undeliverable,
            deliverable: v.result == EmailVerdict::Deliverable,
            risk,
            score: v.score,
            sources: Some(v.sources),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HunterEnvelope {
    data: HunterVerification,
}

#[derive(Debug, Deserialize)]
struct HunterVerification {
    result: EmailVerdict,
    score: Option<u8>,
    #[serde(default)]
    sources: Vec<serde_json::Value>,
}

/// Hunter.io `email-verifier` client.
pub struct HunterClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HunterClient {
    /// # Errors
    ///
    /// Returns [`ValidationError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_base_url(api_key, HUNTER_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            client: build_client(HUNTER_TIMEOUT)?,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmailVerifier for HunterClient {
    async fn verify(&self, email: &str) -> Result<EmailVerification, ValidationError> {
        let resp = self
            .client
            .get(format!("{}/email-verifier", self.base_url))
            .query(&[("email", email), ("api_key", self.api_key.as_str())])
            .send()
            .await?;
        let envelope: HunterEnvelope = read_json("hunter", "hunter email-verifier", resp).await?;
        let data = envelope.data;
        Ok(EmailVerification {
            result: data.result,
            score: data.score,
            sources: u32::try_from(data.sources.len()).unwrap_or(u32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_check() {
        assert!(is_well_formed("owner@acme.io"));
        assert!(!is_well_formed("owner@acme"));
        assert!(!is_well_formed("no at sign.com"));
        assert!(!is_well_formed("two@@acme.io"));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn free_mail_is_low_risk() {
        assert_eq!(heuristic_email("a@gmail.com").risk, EmailRisk::Low);
        assert_eq!(heuristic_email("a@Outlook.com").risk, EmailRisk::Low);
        assert_eq!(heuristic_email("a@acme.io").risk, EmailRisk::Medium);
        assert!(heuristic_email("a@acme.io").deliverable);
    }

    #[test]
    fn verdict_mapping() {
        let v = |result| EmailValidation::from(EmailVerification {
            result,
            score: Some(50),
            sources: 2,
        });
        let deliverable = v(EmailVerdict::Deliverable);
        assert!(deliverable.valid && deliverable.deliverable);
        assert_eq!(deliverable.risk, EmailRisk::Low);
        assert_eq!(deliverable.sources, Some(2));

        let risky = v(EmailVerdict::Risky);
        assert!(risky.valid && !risky.deliverable);
        assert_eq!(risky.risk, EmailRisk::Medium);

        let bad = v(EmailVerdict::Undeliverable);
        assert!(!bad.valid);
        assert_eq!(bad.risk, EmailRisk::High);

        assert_eq!(v(EmailVerdict::Unknown).risk, EmailRisk::Medium);
    }

    #[test]
    fn unrecognised_verdict_deserialises_as_unknown() {
        let verdict: EmailVerdict = serde_json::from_str("\"accept_all\"").unwrap();
        assert_eq!(verdict, EmailVerdict::Unknown);
    }
}
