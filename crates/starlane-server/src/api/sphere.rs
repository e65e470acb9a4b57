use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use starlane_core::NormalizedSystem;
use starlane_upstream::{normalize, RawRecords};

use crate::middleware::RequestId;

use super::{map_query_rejection, map_upstream_error, require_param, ApiError, AppState};

const FETCH_FAILED: &str = "failed to fetch sphere systems";
pub(super) const DEFAULT_RADIUS: f64 = 100.0;
pub(super) const DEFAULT_MIN_RADIUS: f64 = 0.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SphereQuery {
    pub system_name: Option<String>,
    pub radius: Option<String>,
    pub min_radius: Option<String>,
}

/// Parses an optional light-year distance. Blank falls back to `default`;
/// negative, non-finite or non-numeric input is a 400.
pub(super) fn parse_distance_param(
    value: Option<&str>,
    name: &str,
    default: f64,
) -> Result<f64, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "invalid parameter: {name} must be a non-negative number"
        ))),
    }
}

pub(super) async fn sphere_systems(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SphereQuery>, QueryRejection>,
) -> Result<Json<Vec<NormalizedSystem>>, ApiError> {
    let Query(query) = query.map_err(|e| map_query_rejection(&e))?;
    let system_name = require_param(query.system_name.as_deref(), "systemName")?;
    let radius = parse_distance_param(query.radius.as_deref(), "radius", DEFAULT_RADIUS)?;
    let min_radius =
        parse_distance_param(query.min_radius.as_deref(), "minRadius", DEFAULT_MIN_RADIUS)?;

    let raw = state
        .edsm
        .sphere_systems(system_name, radius, min_radius)
        .await
        .map_err(|e| map_upstream_error(&req_id, FETCH_FAILED, &e))?;

    let records = RawRecords::Json(raw);
    let source = records.source_kind();
    let systems = normalize(records);
    tracing::info!(
        request_id = %req_id.0,
        system_name,
        radius,
        min_radius,
        ?source,
        count = systems.len(),
        "sphere systems resolved"
    );
    Ok(Json(systems))
}
