mod leads;
mod sources;
mod validation;

use std::sync::Arc;

use alphaleads_core::{AppConfig, LeadStore, StoreError};
use alphaleads_pipeline::LeadPipeline;
use alphaleads_validation::LeadValidator;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LeadPipeline>,
    pub validator: Arc<LeadValidator>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
    providers: Vec<&'static str>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "store_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound(_) => ApiError::new(request_id, "not_found", "lead not found"),
        StoreError::Unavailable => {
            ApiError::new(request_id, "store_unavailable", "lead storage is not configured")
        }
        StoreError::Backend(_) => {
            tracing::error!(error = %error, "lead store operation failed");
            ApiError::new(request_id, "internal_error", "lead store operation failed")
        }
    }
}

/// Unwraps a JSON body, turning axum's rejection into a `validation_error`.
pub(super) fn json_body<T>(
    request_id: &str,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::new(request_id, "validation_error", rejection.body_text()))
}

pub(super) fn require_store(
    state: &AppState,
    request_id: &str,
) -> Result<Arc<dyn LeadStore>, ApiError> {
    state
        .pipeline
        .store()
        .cloned()
        .ok_or_else(|| map_store_error(request_id.to_owned(), &StoreError::Unavailable))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/leads", get(leads::list_leads))
        .route("/api/v1/leads/generate", post(leads::generate_leads))
        .route("/api/v1/leads/export.csv", get(leads::export_leads_csv))
        .route("/api/v1/leads/bulk-delete", post(leads::bulk_delete_leads))
        .route(
            "/api/v1/leads/{id}",
            get(leads::get_lead).delete(leads::delete_lead),
        )
        .route("/api/v1/leads/{id}/status", patch(leads::update_lead_status))
        .route("/api/v1/validate/email", post(validation::validate_email))
        .route("/api/v1/validate/phone", post(validation::validate_phone))
        .route(
            "/api/v1/validate/business",
            post(validation::validate_business),
        )
        .route("/api/v1/validate/lead", post(validation::validate_lead))
        .route("/api/v1/sources", get(sources::list_sources))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let store = if state.pipeline.store().is_some() {
        "attached"
    } else {
        "none"
    };
    ApiResponse::new(
        HealthData {
            status: "ok",
            store,
            providers: state.pipeline.enabled_providers(),
        },
        req_id.0,
    )
}
