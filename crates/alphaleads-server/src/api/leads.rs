use alphaleads_core::{Lead, LeadFilters, LeadStatus, SearchCriteria};
use alphaleads_pipeline::{leads_to_csv, PipelineResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{json_body, map_store_error, require_store, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusRequest {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct BulkDeleteResponse {
    deleted: u64,
}

/// POST /api/v1/leads/generate: run the pipeline for one search.
pub(super) async fn generate_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchCriteria>, JsonRejection>,
) -> Result<Json<ApiResponse<PipelineResult>>, ApiError> {
    let criteria = json_body(&req_id.0, payload)?;
    let result = state.pipeline.generate_leads(&criteria).await;

    if !result.success {
        let message = result
            .error
            .unwrap_or_else(|| "invalid search criteria".to_string());
        return Err(ApiError::new(req_id.0, "validation_error", message));
    }

    Ok(ApiResponse::new(result, req_id.0))
}

/// GET /api/v1/leads: stored leads matching the query filters.
pub(super) async fn list_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filters): Query<LeadFilters>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, ApiError> {
    let leads = state
        .pipeline
        .get_leads(&filters)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(leads, req_id.0))
}

/// GET /api/v1/leads/export.csv: stored leads as a CSV attachment.
pub(super) async fn export_leads_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filters): Query<LeadFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = state
        .pipeline
        .get_leads(&filters)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        leads_to_csv(&leads),
    ))
}

pub(super) async fn get_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let store = require_store(&state, &req_id.0)?;
    let lead = store
        .get(&id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(lead, req_id.0))
}

/// PATCH /api/v1/leads/{id}/status
pub(super) async fn update_lead_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let body = json_body(&req_id.0, payload)?;
    let store = require_store(&state, &req_id.0)?;
    let lead = store
        .update_status(&id, body.status)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    tracing::info!(lead_id = %lead.id, status = %lead.status, "lead status updated");
    Ok(ApiResponse::new(lead, req_id.0))
}

pub(super) async fn delete_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let store = require_store(&state, &req_id.0)?;
    store
        .delete(&id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(
        serde_json::json!({ "deleted": true }),
        req_id.0,
    ))
}

/// POST /api/v1/leads/bulk-delete: body `{"ids": [...]}`.
pub(super) async fn bulk_delete_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BulkDeleteResponse>>, ApiError> {
    let body = json_body(&req_id.0, payload)?;
    if body.ids.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "ids must contain at least one lead id",
        ));
    }

    let store = require_store(&state, &req_id.0)?;
    let deleted = store
        .delete_many(&body.ids)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(BulkDeleteResponse { deleted }, req_id.0))
}
