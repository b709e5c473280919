use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tileops_core::TileError;

// ---------------------------------------------------------------------------
// Internal sentinel for 401 Unauthorized
// ---------------------------------------------------------------------------

/// Carries "who are you?" failures through the `anyhow::Error` chain. The
/// core's `Unauthorized` means the actor is known but not allowed (403).
#[derive(Debug)]
struct UnauthenticatedError(String);

impl std::fmt::Display for UnauthenticatedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthenticatedError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 401 Unauthorized error.
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self(UnauthenticatedError(msg.into()).into())
    }

    pub fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

fn status_for(e: &TileError) -> StatusCode {
    match e {
        TileError::JobNotFound(_)
        | TileError::InvoiceNotFound(_)
        | TileError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        TileError::InvalidStatus(_)
        | TileError::InvalidInvoiceStatus(_)
        | TileError::InvalidDate(_)
        | TileError::Validation(_)
        | TileError::Json(_) => StatusCode::BAD_REQUEST,
        TileError::Unauthorized(_) => StatusCode::FORBIDDEN,
        TileError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TileError::Backend(_) => StatusCode::BAD_GATEWAY,
        TileError::Io(_) | TileError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(u) = self.0.downcast_ref::<UnauthenticatedError>() {
            let body = serde_json::json!({ "error": u.0.clone() });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }

        let Some(e) = self.0.downcast_ref::<TileError>() else {
            tracing::error!(error = %self.0, "unhandled error");
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        };

        let status = status_for(e);
        if status.is_server_error() {
            tracing::error!(error = %e, "request failed");
        }
        let body = match e {
            TileError::Validation(fields) => serde_json::json!({
                "error": e.to_string(),
                "fields": fields,
            }),
            _ => serde_json::json!({ "error": e.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
