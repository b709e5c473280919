use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tileops_core::model::Profile;
use tileops_core::status::JobStatus;
use tileops_core::views::{RequestStatusChange, StatusChangeOutcome, View, ViewKind};

use crate::auth::Actor;
use crate::error::AppError;
use crate::routes::dashboard::ViewParams;
use crate::state::AppState;

async fn render(
    app: AppState,
    actor: Profile,
    params: ViewParams,
    kind: ViewKind,
) -> Result<Json<View>, AppError> {
    let request = params.into_request(Some(kind))?;
    let today = app.today();
    let dashboard = app.dashboard.clone();
    let view = tokio::task::spawn_blocking(move || dashboard.view(&actor, &request, today))
        .await
        .map_err(AppError::join)?;
    Ok(Json(view))
}

/// GET /api/views/kanban
pub async fn get_kanban(
    State(app): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<View>, AppError> {
    render(app, actor, ViewParams::default(), ViewKind::Kanban).await
}

/// GET /api/views/calendar?month=YYYY-MM
pub async fn get_calendar(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<ViewParams>,
) -> Result<Json<View>, AppError> {
    render(app, actor, params, ViewKind::Calendar).await
}

/// GET /api/views/timeline?month=YYYY-MM
pub async fn get_timeline(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<ViewParams>,
) -> Result<Json<View>, AppError> {
    render(app, actor, params, ViewKind::Timeline).await
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub job_id: String,
    pub new_status: JobStatus,
}

/// POST /api/views/kanban/moves: settle a card drop. Always 200; the
/// outcome says whether the board keeps the move or rolls it back.
pub async fn move_card(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Json(body): Json<MoveBody>,
) -> Result<Json<StatusChangeOutcome>, AppError> {
    let request = RequestStatusChange {
        job_id: body.job_id,
        new_status: body.new_status,
        actor: actor.id,
    };
    let dashboard = app.dashboard.clone();
    let outcome = tokio::task::spawn_blocking(move || dashboard.request_status_change(&request))
        .await
        .map_err(AppError::join)?;
    Ok(Json(outcome))
}
