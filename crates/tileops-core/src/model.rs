use crate::status::{JobStatus, Role};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_location_lat: Option<f64>,
    #[serde(default)]
    pub last_location_lng: Option<f64>,
    #[serde(default)]
    pub last_location_updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Profile {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn location(&self) -> Option<GeoPoint> {
        match (self.last_location_lat, self.last_location_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_number: i64,
    pub title: String,
    pub status: JobStatus,
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
    pub actual_days: Option<i64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub actual_cost: Option<f64>,
    #[serde(default)]
    pub amount_invoiced: Option<f64>,
    #[serde(default)]
    pub amount_paid: Option<f64>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Last day on site: `scheduled_end`, or the start day when no end is set.
    pub fn last_scheduled_day(&self) -> Option<NaiveDate> {
        self.scheduled_end.or(self.scheduled_start)
    }

    /// True when `date` falls within the scheduled span (inclusive).
    pub fn occupies(&self, date: NaiveDate) -> bool {
        match (self.scheduled_start, self.last_scheduled_day()) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }

    pub fn is_assigned_to(&self, profile_id: &str) -> bool {
        self.assigned_to.as_deref() == Some(profile_id)
    }

    /// Invoiced minus paid; may be negative when overpaid.
    pub fn balance_due(&self) -> f64 {
        self.amount_invoiced.unwrap_or(0.0) - self.amount_paid.unwrap_or(0.0)
    }

    /// Advisory check: more money collected than invoiced.
    pub fn payment_exceeds_invoiced(&self) -> bool {
        self.amount_paid.unwrap_or(0.0) > self.amount_invoiced.unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// JobWithAssignee
// ---------------------------------------------------------------------------

/// A job with its assignee resolved. Every view consumes this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobWithAssignee {
    #[serde(flatten)]
    pub job: Job,
    #[serde(default)]
    pub assignee: Option<Profile>,
}

impl JobWithAssignee {
    /// Attach the assignee from `profiles` by id. An id with no match
    /// resolves to `None`.
    pub fn resolve(job: Job, profiles: &[Profile]) -> Self {
        let assignee = job
            .assigned_to
            .as_deref()
            .and_then(|id| profiles.iter().find(|p| p.id == id))
            .cloned();
        Self { job, assignee }
    }
}

impl std::ops::Deref for JobWithAssignee {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

/// Dashboard order: scheduled start ascending with unscheduled jobs last,
/// then newest first.
pub fn dashboard_order(a: &Job, b: &Job) -> Ordering {
    let by_start = match (a.scheduled_start, b.scheduled_start) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_start.then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort_for_dashboard(jobs: &mut [JobWithAssignee]) {
    jobs.sort_by(|a, b| dashboard_order(&a.job, &b.job));
}

// ---------------------------------------------------------------------------
// JobPhoto
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPhoto {
    pub id: String,
    pub job_id: String,
    pub storage_path: String,
    pub file_name: String,
    #[serde(default)]
    pub photo_type: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    pub fn date(s: &str) -> NaiveDate {
        crate::dates::parse_date(s).unwrap()
    }

    fn profile(id: &str, role: Role) -> Profile {
        Profile {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            full_name: format!("Person {id}"),
            role,
            phone: None,
            is_active: true,
            created_at: ts(2025, 1, 1),
            last_location_lat: None,
            last_location_lng: None,
            last_location_updated_at: None,
        }
    }

    pub fn owner(id: &str) -> Profile {
        profile(id, Role::Owner)
    }

    pub fn lead(id: &str) -> Profile {
        profile(id, Role::Lead)
    }

    pub fn job(id: &str, status: JobStatus, assigned_to: Option<&str>) -> Job {
        Job {
            id: id.to_string(),
            job_number: 1,
            title: format!("Job {id}"),
            status,
            client_name: "Client".to_string(),
            client_phone: None,
            client_email: None,
            client_address: None,
            job_type: None,
            square_footage: None,
            scope_notes: None,
            scheduled_start: None,
            scheduled_end: None,
            estimated_days: None,
            actual_days: None,
            estimated_cost: None,
            actual_cost: None,
            amount_invoiced: None,
            amount_paid: None,
            assigned_to: assigned_to.map(str::to_string),
            notes: None,
            created_by: None,
            created_at: ts(2025, 1, 1),
            updated_at: ts(2025, 1, 1),
        }
    }

    pub fn with_assignee(job: Job) -> JobWithAssignee {
        JobWithAssignee {
            job,
            assignee: None,
        }
    }
}
