//! Time-series and archive query routes

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use sift_protocol::archive_key;
use sift_store::{RangeQuery, SeriesData};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Query routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/timeseries/range", post(timeseries_range))
        .route("/archive/{day}/{entry_id}", get(archive_lookup))
}

/// POST /timeseries/range
///
/// Aggregated multi-series range over the severity time series; the
/// body is the range query, every field optional.
async fn timeseries_range(
    State(state): State<AppState>,
    Json(query): Json<RangeQuery>,
) -> Result<Json<Vec<SeriesData>>> {
    let series = state.store.timeseries_range(&query).await?;
    Ok(Json(series))
}

/// GET /archive/{day}/{entry_id}
///
/// Fetch one archived event by its day bucket (UTC midnight epoch
/// seconds) and raw-topic entry id.
async fn archive_lookup(
    Path((day, entry_id)): Path<(i64, String)>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let key = archive_key(day, &entry_id);
    match state.store.doc_get(&key).await? {
        Some(doc) => Ok(Json(doc)),
        None => Err(ApiError::not_found("archived event", key)),
    }
}
