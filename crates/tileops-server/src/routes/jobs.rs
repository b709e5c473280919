use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tileops_core::dashboard::JobDetail;
use tileops_core::model::JobWithAssignee;
use tileops_core::status::JobStatus;
use tileops_core::validation::NewJob;

use crate::auth::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/jobs: every job in dashboard order.
pub async fn list_jobs(
    State(app): State<AppState>,
    Actor(_actor): Actor,
) -> Result<Json<Vec<JobWithAssignee>>, AppError> {
    let dashboard = app.dashboard.clone();
    let jobs = tokio::task::spawn_blocking(move || dashboard.jobs())
        .await
        .map_err(AppError::join)?;
    Ok(Json(jobs))
}

/// GET /api/jobs/{id}: job with financials, invoices, photos and the
/// transitions this actor may take.
pub async fn get_job(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<JobDetail>, AppError> {
    let dashboard = app.dashboard.clone();
    let detail = tokio::task::spawn_blocking(move || dashboard.job_detail(&actor, &id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(detail))
}

/// POST /api/jobs: create a lead. Owner only.
pub async fn create_job(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Json(body): Json<NewJob>,
) -> Result<(StatusCode, Json<JobWithAssignee>), AppError> {
    let dashboard = app.dashboard.clone();
    let job = tokio::task::spawn_blocking(move || dashboard.create_job(&actor, body))
        .await
        .map_err(AppError::join)??;
    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// POST /api/jobs/{id}/status: move a job, subject to the actor's role.
pub async fn update_status(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<JobWithAssignee>, AppError> {
    let target: JobStatus = body.status.parse()?;
    let dashboard = app.dashboard.clone();
    let job = tokio::task::spawn_blocking(move || dashboard.change_status(&actor, &id, target))
        .await
        .map_err(AppError::join)??;
    Ok(Json(job))
}
