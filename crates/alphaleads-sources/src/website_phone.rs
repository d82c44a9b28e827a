//! Best-effort phone discovery from a business's own website.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::SourceError;
use crate::http::build_client;

const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Tried in order; the first pattern with a match that survives
/// normalisation wins.
static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\+8801[3-9]\d{8}",
        r"\b8801[3-9]\d{8}\b",
        r"\b01[3-9]\d{8}\b",
        r"\+\d{1,3}[\s-]?\d{6,14}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid phone regex"))
    .collect()
});

static BD_E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+8801[3-9]\d{8}$").expect("valid BD E.164 regex"));
static BD_INTL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^8801[3-9]\d{8}$").expect("valid BD intl regex"));
static BD_LOCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^01[3-9]\d{8}$").expect("valid BD local regex"));

fn is_bangladesh(country: &str) -> bool {
    matches!(country.trim().to_lowercase().as_str(), "bd" | "bangladesh")
}

/// Normalises a scraped phone string for `country`.
///
/// Bangladesh numbers must be mobile numbers in E.164, international or
/// local form and come back as `+8801…`; anything else is rejected. Other
/// countries keep digits and `+`, gaining a leading `+` when absent.
#[must_use]
pub fn normalize_phone(raw: &str, country: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if is_bangladesh(country) {
        if BD_E164.is_match(&cleaned) {
            return Some(cleaned);
        }
        if BD_INTL.is_match(&cleaned) {
            return Some(format!("+{cleaned}"));
        }
        if BD_LOCAL.is_match(&cleaned) {
            return Some(format!("+880{cleaned}"));
        }
        return None;
    }

    if cleaned.starts_with('+') {
        Some(cleaned)
    } else {
        Some(format!("+{cleaned}"))
    }
}

/// Returns the first phone number in `html` that normalises for `country`.
#[must_use]
pub fn extract_phone(html: &str, country: &str) -> Option<String> {
    PHONE_PATTERNS.iter().find_map(|re| {
        re.find(html)
            .and_then(|m| normalize_phone(m.as_str(), country))
    })
}

/// Fetches business websites with a short timeout and scans them for a
/// phone number.
#[derive(Debug, Clone)]
pub struct WebsitePhoneFinder {
    client: reqwest::Client,
}

impl WebsitePhoneFinder {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(FETCH_TIMEOUT, user_agent)?,
        })
    }

    /// Returns a normalised phone from `website`, or `None` on any failure.
    pub async fn find(&self, website: &str, country: &str) -> Option<String> {
        let url = if website.starts_with("http://") || website.starts_with("https://") {
            website.to_string()
        } else {
            format!("https://{website}")
        };

        let html = match self.fetch_html(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "website phone lookup failed");
                return None;
            }
        };
        extract_phone(&html, country)
    }

    async fn fetch_html(&self, url: &str) -> Result<String, SourceError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                provider: "website",
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}
