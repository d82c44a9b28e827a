//! Shared HTTP plumbing for provider clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::SourceError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds a `reqwest` client with a per-request timeout and the configured
/// `User-Agent`.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(user_agent)
        .build()
        .map_err(SourceError::from)
}

/// Normalises a caller-supplied base URL by stripping trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> Result<String, SourceError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SourceError::InvalidBaseUrl {
            url: url.to_string(),
            reason: "URL is empty".to_string(),
        });
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(SourceError::InvalidBaseUrl {
            url: url.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Maps the response status to an error and decodes the body as `T`.
///
/// HTTP 429 becomes [`SourceError::RateLimited`]; any other non-2xx status
/// becomes [`SourceError::UnexpectedStatus`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    context: &str,
    response: reqwest::Response,
) -> Result<T, SourceError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited { provider });
    }
    if !status.is_success() {
        return Err(SourceError::UnexpectedStatus {
            provider,
            status: status.as_u16(),
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| SourceError::Deserialize {
        context: context.to_string(),
        source,
    })
}
