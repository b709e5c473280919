use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tileops_core::model::Profile;

use crate::error::AppError;
use crate::state::AppState;

/// Header naming the profile a request acts as.
pub const PROFILE_HEADER: &str = "x-profile-id";

/// The profile behind the current request.
///
/// Demo mode treats a missing header as the demo owner. Live mode rejects a
/// missing, unknown or inactive profile with 401.
#[derive(Debug, Clone)]
pub struct Actor(pub Profile);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = match parts.headers.get(PROFILE_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| AppError::unauthenticated("x-profile-id is not valid text"))?
                    .to_string(),
            ),
            None => None,
        };
        let dashboard = state.dashboard.clone();
        let actor = tokio::task::spawn_blocking(move || dashboard.resolve_actor(header.as_deref()))
            .await
            .map_err(AppError::join)?
            .map_err(|e| {
                tracing::debug!(error = %e, "actor rejected");
                AppError::unauthenticated(e.to_string())
            })?;
        Ok(Actor(actor))
    }
}
