use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use starlane_core::NormalizedSystem;
use starlane_upstream::{normalize, RawRecords};

use crate::middleware::RequestId;

use super::{map_query_rejection, map_upstream_error, require_param, ApiError, AppState};

const FETCH_FAILED: &str = "failed to fetch nearest systems";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearestQuery {
    pub reference_system: Option<String>,
    pub any_population: Option<String>,
}

/// Lenient boolean: `true`, `1`, `yes` and `on` (any case) are true; anything
/// else, including an absent parameter, is false.
pub(super) fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    })
}

pub(super) async fn nearest_systems(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<NearestQuery>, QueryRejection>,
) -> Result<Json<Vec<NormalizedSystem>>, ApiError> {
    let Query(query) = query.map_err(|e| map_query_rejection(&e))?;
    let reference = require_param(query.reference_system.as_deref(), "referenceSystem")?;
    let any_population = parse_flag(query.any_population.as_deref());

    let rows = state
        .inara
        .nearest_systems(reference, any_population)
        .await
        .map_err(|e| map_upstream_error(&req_id, FETCH_FAILED, &e))?;

    let records = RawRecords::Scraped(rows);
    let source = records.source_kind();
    let systems = normalize(records);
    tracing::info!(
        request_id = %req_id.0,
        reference,
        any_population,
        ?source,
        count = systems.len(),
        "nearest systems resolved"
    );
    Ok(Json(systems))
}
