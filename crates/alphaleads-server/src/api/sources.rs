use alphaleads_pipeline::{source_statuses, ServiceKind, SourceStatus};
use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SourcesData {
    sources: Vec<SourceStatus>,
    enabled_providers: usize,
    validation_enabled: bool,
}

/// GET /api/v1/sources: which providers and validation services are live.
pub(super) async fn list_sources(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SourcesData>> {
    let sources = source_statuses(&state.config);
    let enabled_providers = sources
        .iter()
        .filter(|s| s.kind == ServiceKind::Provider && s.enabled)
        .count();

    ApiResponse::new(
        SourcesData {
            sources,
            enabled_providers,
            validation_enabled: state.config.validation_enabled,
        },
        req_id.0,
    )
}
