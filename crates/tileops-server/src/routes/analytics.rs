use axum::extract::State;
use axum::Json;
use tileops_core::analytics::AnalyticsReport;

use crate::auth::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/analytics: revenue, pipeline, variances and workload.
pub async fn get_analytics(
    State(app): State<AppState>,
    Actor(_actor): Actor,
) -> Result<Json<AnalyticsReport>, AppError> {
    let dashboard = app.dashboard.clone();
    let report = tokio::task::spawn_blocking(move || dashboard.analytics())
        .await
        .map_err(AppError::join)?;
    Ok(Json(report))
}
