use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tileops_core::dashboard::Overview;
use tileops_core::dates::YearMonth;
use tileops_core::views::{ViewKind, ViewRequest};
use tileops_core::TileError;

use crate::auth::Actor;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub mine: Option<bool>,
    #[serde(default)]
    pub month: Option<String>,
}

impl ViewParams {
    /// Unknown view names fall back to the list; a malformed month is a 400.
    pub fn into_request(self, kind: Option<ViewKind>) -> Result<ViewRequest, TileError> {
        let month = match self.month.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => Some(m.parse::<YearMonth>()?),
            _ => None,
        };
        Ok(ViewRequest {
            kind: kind.unwrap_or_else(|| ViewKind::parse(self.view.as_deref())),
            mine_only: self.mine.unwrap_or(false),
            month,
        })
    }
}

/// GET /api/mode: demo or live, for the banner.
pub async fn get_mode(State(app): State<AppState>) -> Json<serde_json::Value> {
    let mode = app.dashboard.mode();
    Json(serde_json::json!({
        "mode": mode,
        "demo": mode.is_demo(),
    }))
}

/// GET /api/dashboard: metric cards plus the selected view.
pub async fn get_dashboard(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<ViewParams>,
) -> Result<Json<Overview>, AppError> {
    let request = params.into_request(None)?;
    let today = app.today();
    let dashboard = app.dashboard.clone();
    let overview =
        tokio::task::spawn_blocking(move || dashboard.overview(&actor, &request, today))
            .await
            .map_err(AppError::join)?;
    Ok(Json(overview))
}
