use axum::{
    Json,
    extract::{Query, State},
};
use tally_types::models::{Period, User};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// GET /leaderboard?periodo=dia|semana|mes|total
///
/// Query pairs are taken raw so repeated or odd parameters never reject the
/// request; the first `periodo` wins.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let periodo = params.iter().find(|(k, _)| k == "periodo").map(|(_, v)| v.as_str());
    let period = parse_period(periodo);
    let users = run_blocking(&state, move |db| db.get_leaderboard_for_period(period)).await?;
    Ok(Json(users))
}

/// Missing or unrecognised values fall back to the lifetime ranking.
fn parse_period(raw: Option<&str>) -> Period {
    match raw {
        None => Period::Total,
        Some(raw) => Period::parse(raw).unwrap_or_else(|| {
            debug!("Unknown periodo '{}', using total", raw);
            Period::Total
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_defaults_to_total() {
        assert_eq!(parse_period(None), Period::Total);
        assert_eq!(parse_period(Some("decade")), Period::Total);
        assert_eq!(parse_period(Some("mes")), Period::Mes);
    }
}
