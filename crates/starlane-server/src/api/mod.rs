mod nearest;
mod sphere;
mod system;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::rejection::QueryRejection,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use starlane_core::AppConfig;
use starlane_upstream::{EdsmClient, InaraClient, UpstreamError};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Upstream clients shared by every handler. Holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub edsm: Arc<EdsmClient>,
    pub inara: Arc<InaraClient>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if either client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            edsm: Arc::new(EdsmClient::from_config(config)?),
            inara: Arc::new(InaraClient::from_config(config)?),
        })
    }
}

/// Error payload: `{error, details?}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    pub fn upstream(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Returns the trimmed value of a required query parameter, or a 400 naming it.
pub(super) fn require_param<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "missing required parameter: {name}"
        ))),
    }
}

/// Turns an unparseable query string into the JSON 400 shape.
pub(super) fn map_query_rejection(rejection: &QueryRejection) -> ApiError {
    ApiError {
        details: Some(rejection.body_text()),
        ..ApiError::bad_request("invalid query string")
    }
}

pub(super) fn map_upstream_error(
    req_id: &RequestId,
    message: &'static str,
    error: &UpstreamError,
) -> ApiError {
    tracing::error!(request_id = %req_id.0, error = %error, "{message}");
    ApiError::upstream(message, error.cause_description())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Assembles the proxy router. Unmatched paths are served from `static_dir`.
pub fn build_app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/nearest-systems", get(nearest::nearest_systems))
        .route("/api/sphere-systems", get(sphere::sphere_systems))
        .route("/api/bodies", get(system::bodies))
        .route("/api/system-coordinates", get(system::system_coordinates))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData {
        status: "ok",
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
