use crate::error::{FieldError, Result, TileError};
use crate::model::Job;
use crate::status::JobStatus;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Longest estimate accepted for a new job, about ten years.
pub const MAX_ESTIMATED_DAYS: i64 = 3650;

/// Job categories offered when creating a job. Stored as free text.
pub const JOB_TYPES: &[&str] = &[
    "Bathroom Tile",
    "Shower Tile",
    "Floor Tile",
    "Backsplash",
    "Tile Repair",
    "Tile Reglazing",
    "Other",
];

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}$").unwrap())
}

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_re().is_match(phone.trim())
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email.trim())
}

pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

/// Trimmed value, or `None` when blank.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// NewJob
// ---------------------------------------------------------------------------

/// Input for a new job. Blank optional strings are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub client_name: String,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub square_footage: Option<f64>,
    #[serde(default)]
    pub scope_notes: Option<String>,
    #[serde(default)]
    pub scheduled_start: Option<NaiveDate>,
    #[serde(default)]
    pub scheduled_end: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_days: Option<i64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewJob {
    /// Collect every field problem; an empty result means the job is valid.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self.client_name.trim().is_empty() {
            errors.push(FieldError::new("client_name", "Client name is required"));
        } else if !is_valid_name(&self.client_name) {
            errors.push(FieldError::new(
                "client_name",
                "Name must be at least 2 characters",
            ));
        }
        if let Some(email) = present(&self.client_email) {
            if !is_valid_email(&email) {
                errors.push(FieldError::new("client_email", "Enter a valid email address"));
            }
        }
        if let Some(phone) = present(&self.client_phone) {
            if !is_valid_phone(&phone) {
                errors.push(FieldError::new(
                    "client_phone",
                    "Enter a valid phone number, e.g. (617) 555-1234",
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.scheduled_start, self.scheduled_end) {
            if end < start {
                errors.push(FieldError::new(
                    "scheduled_end",
                    "End date must be on or after start date",
                ));
            }
        }
        if self.square_footage.is_some_and(|v| !(v >= 0.0)) {
            errors.push(FieldError::new("square_footage", "Must not be negative"));
        }
        match self.estimated_days {
            Some(v) if v < 0 => {
                errors.push(FieldError::new("estimated_days", "Must not be negative"))
            }
            Some(v) if v > MAX_ESTIMATED_DAYS => errors.push(FieldError::new(
                "estimated_days",
                format!("Must be at most {MAX_ESTIMATED_DAYS} days"),
            )),
            _ => {}
        }
        if self.estimated_cost.is_some_and(|v| !(v >= 0.0)) {
            errors.push(FieldError::new("estimated_cost", "Must not be negative"));
        }
        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TileError::Validation(errors))
        }
    }

    /// Validate and build the stored job. New jobs always start as leads with
    /// nothing invoiced or paid.
    pub fn into_job(
        self,
        id: impl Into<String>,
        job_number: i64,
        created_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Job> {
        self.validate()?;
        Ok(Job {
            id: id.into(),
            job_number,
            title: self.title.trim().to_string(),
            status: JobStatus::Lead,
            client_name: self.client_name.trim().to_string(),
            client_phone: present(&self.client_phone),
            client_email: present(&self.client_email),
            client_address: present(&self.client_address),
            job_type: present(&self.job_type),
            square_footage: self.square_footage,
            scope_notes: present(&self.scope_notes),
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            estimated_days: self.estimated_days,
            actual_days: None,
            estimated_cost: self.estimated_cost,
            actual_cost: None,
            amount_invoiced: Some(0.0),
            amount_paid: Some(0.0),
            assigned_to: present(&self.assigned_to),
            notes: present(&self.notes),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}
