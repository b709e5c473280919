use axum::extract::State;
use axum::Json;
use tileops_core::content::CompanyInfo;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/content/company: always a complete record.
pub async fn get_company(State(app): State<AppState>) -> Result<Json<CompanyInfo>, AppError> {
    let content = app.content.clone();
    let info = tokio::task::spawn_blocking(move || content.company_info())
        .await
        .map_err(AppError::join)?;
    Ok(Json(info))
}
