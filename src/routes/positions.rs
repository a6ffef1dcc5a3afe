//! Position Store HTTP routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::position::PositionRecord;
use tracing::warn;
use uuid::Uuid;

use crate::services::positions::{self, PositionError};
use crate::state::AppState;

/// `GET /api/projects/:project_id/positions`: all persisted positions.
pub async fn get_positions(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<PositionRecord>>, StatusCode> {
    let records = positions::load_positions(&state.pool, project_id)
        .await
        .map_err(|e| {
            warn!(%project_id, error = %e, "position load failed");
            position_error_to_status(e)
        })?;
    Ok(Json(records))
}

/// `PUT /api/projects/:project_id/positions`: replace all positions atomically.
pub async fn put_positions(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(records): Json<Vec<PositionRecord>>,
) -> Result<StatusCode, StatusCode> {
    positions::replace_positions(&state, project_id, &records)
        .await
        .map_err(|e| {
            warn!(%project_id, error = %e, "position save rejected");
            position_error_to_status(e)
        })?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn position_error_to_status(err: PositionError) -> StatusCode {
    if err.is_validation() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::INTERNAL_SERVER_ERROR }
}

#[cfg(test)]
#[path = "positions_test.rs"]
mod tests;
