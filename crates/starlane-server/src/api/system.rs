//! Body listing and coordinate lookup. Both pass the upstream JSON through
//! untouched.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_query_rejection, map_upstream_error, require_param, ApiError, AppState};

const BODIES_FAILED: &str = "failed to fetch system bodies";
const COORDINATES_FAILED: &str = "failed to fetch system coordinates";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SystemQuery {
    pub system_name: Option<String>,
}

pub(super) async fn bodies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SystemQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|e| map_query_rejection(&e))?;
    let system_name = require_param(query.system_name.as_deref(), "systemName")?;
    let payload = state
        .edsm
        .bodies(system_name)
        .await
        .map_err(|e| map_upstream_error(&req_id, BODIES_FAILED, &e))?;
    tracing::info!(request_id = %req_id.0, system_name, "system bodies resolved");
    Ok(Json(payload))
}

pub(super) async fn system_coordinates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SystemQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|e| map_query_rejection(&e))?;
    let system_name = require_param(query.system_name.as_deref(), "systemName")?;
    let payload = state
        .edsm
        .system_coordinates(system_name)
        .await
        .map_err(|e| map_upstream_error(&req_id, COORDINATES_FAILED, &e))?;
    tracing::info!(request_id = %req_id.0, system_name, "system coordinates resolved");
    Ok(Json(payload))
}
