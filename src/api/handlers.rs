//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, TimestepRecord, TimestepsQuery};
use crate::runner::RunSummary;

/// `GET /summary` → 200 + `RunSummary` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<RunSummary> {
    Json(state.summary.clone())
}

/// Returns result rows, optionally filtered by row index.
///
/// `GET /timesteps` → every row
/// `GET /timesteps?from=N&to=M` → rows N..=M
/// `GET /timesteps?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_timesteps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimestepsQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<TimestepRecord> = state
        .results
        .iter()
        .enumerate()
        .skip(from)
        .take_while(|(index, _)| *index <= to)
        .map(|(index, row)| TimestepRecord { index, row: *row })
        .collect();

    Ok(Json(records))
}
