use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tally_db::LedgerError;
use tally_types::api::{RegisterRequest, RegisterResponse};
use tally_types::models::{User, UserStats};
use tracing::warn;

use crate::error::{ActionError, ApiError};
use crate::state::{AppState, run_blocking};

/// GET /usuarios — every user, highest score first.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = run_blocking(&state, |db| db.get_leaderboard()).await?;
    Ok(Json(users))
}

/// POST /usuarios — register a name and hand back its public code.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ActionError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected registration body: {}", e);
        ApiError::BadBody
    })?;
    let nombre = req.nombre.ok_or(LedgerError::EmptyName)?;

    let registration = run_blocking(&state, move |db| db.register_user(&nombre)).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: registration.message,
            codigo_usuario: Some(registration.codigo_usuario),
        }),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<User>, ApiError> {
    run_blocking(&state, move |db| db.get_user_by_code(&codigo))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    run_blocking(&state, move |db| db.get_user_stats(&codigo))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}
