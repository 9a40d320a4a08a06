use std::path::Path;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tally_types::api::HealthResponse;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{leaderboard, points, users};

/// Full HTTP surface. When `static_dir` is given, unmatched paths are served
/// from it so a prebuilt front-end can ship alongside the API.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/leaderboard", get(leaderboard::leaderboard))
        .route("/usuarios", get(users::list_users).post(users::register))
        .route("/usuarios/{codigo}", get(users::get_user))
        .route("/usuarios/{codigo}/estadisticas", get(users::get_stats))
        .route("/puntos", post(points::adjust))
        .route("/health", get(health))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: state.db.backend().to_string(),
    })
}
