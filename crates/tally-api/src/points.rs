use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tally_types::api::{PointsRequest, PointsResponse};
use tally_types::models::Operation;
use tracing::warn;

use crate::error::{ActionError, ApiError};
use crate::state::{AppState, run_blocking};

/// POST /puntos — add or remove one point through a user's public code.
pub async fn adjust(
    State(state): State<AppState>,
    payload: Result<Json<PointsRequest>, JsonRejection>,
) -> Result<Json<PointsResponse>, ActionError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected points body: {}", e);
        ApiError::BadBody
    })?;

    let codigo = req
        .codigo_usuario
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::MissingCode)?;
    let op = req
        .operacion
        .as_deref()
        .and_then(Operation::parse)
        .ok_or(ApiError::InvalidOperation)?;

    let adjustment = run_blocking(&state, move |db| db.adjust_points(&codigo, op)).await?;

    Ok(Json(PointsResponse {
        success: true,
        message: adjustment.message,
        puntos: Some(adjustment.puntos),
    }))
}
