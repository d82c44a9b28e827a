use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ValidationError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn build_client(
    timeout: Duration,
) -> Result<reqwest::Client, ValidationError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(ValidationError::from)
}

/// Maps non-2xx responses to errors and decodes the body as `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    context: &str,
    response: reqwest::Response,
) -> Result<T, ValidationError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ValidationError::RateLimited { service });
    }
    if !status.is_success() {
        return Err(ValidationError::UnexpectedStatus {
            service,
            status: status.as_u16(),
        });
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| ValidationError::Deserialize {
        context: context.to_string(),
        source,
    })
}
