use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single rejected input field, reported back to the caller inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum TileError {
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("invoice not found: {0}")]
    InvoiceNotFound(String),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("invalid job status: {0}")]
    InvalidStatus(String),

    #[error("invalid invoice status: {0}")]
    InvalidInvoiceStatus(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("invalid date '{0}': expected YYYY-MM-DD or YYYY-MM")]
    InvalidDate(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TileError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TileError::Validation(vec![FieldError::new(field, message)])
    }

    /// True for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TileError::JobNotFound(_) | TileError::InvoiceNotFound(_) | TileError::ProfileNotFound(_)
        )
    }
}

impl From<reqwest::Error> for TileError {
    fn from(err: reqwest::Error) -> Self {
        TileError::Backend(err.to_string())
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, TileError>;
