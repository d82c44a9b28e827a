//! Standalone validation endpoints over the shared [`LeadValidator`].
//!
//! [`LeadValidator`]: alphaleads_validation::LeadValidator

use alphaleads_core::{BusinessValidation, EmailValidation, Lead, PhoneValidation};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{json_body, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhoneRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BusinessRequest {
    #[serde(default)]
    pub business_name: String,
    pub website: Option<String>,
}

fn required(request_id: &str, field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("{field} is required"),
        ));
    }
    Ok(())
}

pub(super) async fn validate_email(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EmailValidation>>, ApiError> {
    let body = json_body(&req_id.0, payload)?;
    required(&req_id.0, "email", &body.email)?;

    let result = state.validator.validate_email(&body.email).await;
    Ok(ApiResponse::new(result, req_id.0))
}

pub(super) async fn validate_phone(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<PhoneRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PhoneValidation>>, ApiError> {
    let body = json_body(&req_id.0, payload)?;
    required(&req_id.0, "phone", &body.phone)?;

    Ok(ApiResponse::new(
        state.validator.validate_phone(&body.phone),
        req_id.0,
    ))
}

pub(super) async fn validate_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<BusinessRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BusinessValidation>>, ApiError> {
    let body = json_body(&req_id.0, payload)?;
    required(&req_id.0, "businessName", &body.business_name)?;

    let result = state
        .validator
        .enrich_business(&body.business_name, body.website.as_deref())
        .await;
    Ok(ApiResponse::new(result, req_id.0))
}

/// POST /api/v1/validate/lead: full validation and rescoring of one lead.
pub(super) async fn validate_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<Lead>, JsonRejection>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let lead = json_body(&req_id.0, payload)?;
    let validated = state.validator.validate_lead(lead).await;
    Ok(ApiResponse::new(validated, req_id.0))
}
