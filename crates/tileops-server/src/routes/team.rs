use axum::extract::State;
use axum::Json;
use tileops_core::model::Profile;
use tileops_core::team_map::TeamMap;

use crate::auth::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/team: active members by name.
pub async fn list_team(
    State(app): State<AppState>,
    Actor(_actor): Actor,
) -> Result<Json<Vec<Profile>>, AppError> {
    let dashboard = app.dashboard.clone();
    let team = tokio::task::spawn_blocking(move || dashboard.team())
        .await
        .map_err(AppError::join)?;
    Ok(Json(team))
}

/// GET /api/team-map: member and job-site markers.
pub async fn get_team_map(
    State(app): State<AppState>,
    Actor(_actor): Actor,
) -> Result<Json<TeamMap>, AppError> {
    let dashboard = app.dashboard.clone();
    let map = tokio::task::spawn_blocking(move || dashboard.team_map())
        .await
        .map_err(AppError::join)?;
    Ok(Json(map))
}
