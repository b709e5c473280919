use crate::error::{Result, TileError};
use crate::model::{Job, Profile};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Lead,
    Quoted,
    Scheduled,
    InProgress,
    Completed,
    Paid,
    Cancelled,
}

impl JobStatus {
    pub fn all() -> &'static [JobStatus] {
        &[
            JobStatus::Lead,
            JobStatus::Quoted,
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Paid,
            JobStatus::Cancelled,
        ]
    }

    /// Every status a job can be in while it is still moving forward.
    pub fn board() -> &'static [JobStatus] {
        &JobStatus::all()[..6]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Lead => "lead",
            JobStatus::Quoted => "quoted",
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Paid => "paid",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Completed or paid. Both count toward revenue and on-time figures.
    pub fn is_done(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Paid)
    }

    /// Not yet finished and not cancelled.
    pub fn is_pipeline(self) -> bool {
        matches!(
            self,
            JobStatus::Lead | JobStatus::Quoted | JobStatus::Scheduled | JobStatus::InProgress
        )
    }

    /// Crew is (or is about to be) on site.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Scheduled | JobStatus::InProgress)
    }

    pub fn style(self) -> &'static StatusStyle {
        &STATUS_STYLES[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lead" => Ok(JobStatus::Lead),
            "quoted" => Ok(JobStatus::Quoted),
            "scheduled" => Ok(JobStatus::Scheduled),
            "in_progress" | "in-progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "paid" => Ok(JobStatus::Paid),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(TileError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusStyle: the one presentation table every view reads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub label: &'static str,
    /// Pill/badge classes (list, detail).
    pub badge: &'static str,
    /// Solid fill classes (calendar chips, timeline bars).
    pub fill: &'static str,
    /// Hex color (charts, map markers, kanban column accent).
    pub color: &'static str,
}

/// Indexed by `JobStatus as usize`.
static STATUS_STYLES: [StatusStyle; 7] = [
    StatusStyle {
        label: "Lead",
        badge: "bg-yellow-100 text-yellow-800",
        fill: "bg-yellow-300",
        color: "#eab308",
    },
    StatusStyle {
        label: "Quoted",
        badge: "bg-blue-100 text-blue-800",
        fill: "bg-blue-300",
        color: "#3b82f6",
    },
    StatusStyle {
        label: "Scheduled",
        badge: "bg-purple-100 text-purple-800",
        fill: "bg-purple-300",
        color: "#a855f7",
    },
    StatusStyle {
        label: "In Progress",
        badge: "bg-orange-100 text-orange-800",
        fill: "bg-orange-300",
        color: "#f97316",
    },
    StatusStyle {
        label: "Completed",
        badge: "bg-green-100 text-green-800",
        fill: "bg-green-300",
        color: "#22c55e",
    },
    StatusStyle {
        label: "Paid",
        badge: "bg-emerald-100 text-emerald-800",
        fill: "bg-emerald-300",
        color: "#10b981",
    },
    StatusStyle {
        label: "Cancelled",
        badge: "bg-gray-100 text-gray-800",
        fill: "bg-gray-300",
        color: "#9ca3af",
    },
];

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Lead,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Lead => "lead",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// An edge offered to an actor, with the button text to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOption {
    pub label: &'static str,
    pub next: JobStatus,
}

/// The only edges a crew lead may take, and only on their own jobs.
const LEAD_EDGES: &[(JobStatus, JobStatus, &str)] = &[
    (JobStatus::Scheduled, JobStatus::InProgress, "Start Work"),
    (JobStatus::InProgress, JobStatus::Completed, "Mark Complete"),
];

/// True when `actor` may act on `job` at all (owner, or assignee).
pub fn can_act_on(actor: &Profile, job: &Job) -> bool {
    actor.is_owner() || job.assigned_to.as_deref() == Some(actor.id.as_str())
}

/// Edges to present to `actor` for `job`. Nothing the caller receives here
/// will be rejected by [`authorize_transition`].
pub fn available_transitions(actor: &Profile, job: &Job) -> Vec<TransitionOption> {
    if actor.is_owner() {
        return JobStatus::all()
            .iter()
            .copied()
            .filter(|s| *s != job.status)
            .map(|next| TransitionOption {
                label: next.label(),
                next,
            })
            .collect();
    }
    if !can_act_on(actor, job) {
        return Vec::new();
    }
    LEAD_EDGES
        .iter()
        .filter(|(from, _, _)| *from == job.status)
        .map(|&(_, next, label)| TransitionOption { label, next })
        .collect()
}

/// Check that `actor` may move `job` to `target`.
///
/// A lead touching someone else's job is an authorization failure; a lead
/// asking for an edge they do not hold is an invalid transition.
pub fn authorize_transition(actor: &Profile, job: &Job, target: JobStatus) -> Result<()> {
    if actor.is_owner() {
        return Ok(());
    }
    if !can_act_on(actor, job) {
        return Err(TileError::Unauthorized(format!(
            "job #{} is not assigned to {}",
            job.job_number, actor.full_name
        )));
    }
    let allowed = LEAD_EDGES
        .iter()
        .any(|(from, to, _)| *from == job.status && *to == target);
    if allowed {
        Ok(())
    } else {
        Err(TileError::InvalidTransition {
            from: job.status.to_string(),
            to: target.to_string(),
            reason: "crew leads may only start scheduled work or complete work in progress"
                .to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{job, lead, owner};
    use std::collections::HashSet;

    #[test]
    fn status_roundtrip() {
        use std::str::FromStr;
        for status in JobStatus::all() {
            assert_eq!(JobStatus::from_str(status.as_str()).unwrap(), *status);
        }
        assert!(JobStatus::from_str("archived").is_err());
    }

    #[test]
    fn style_table_is_total_and_unique() {
        let labels: HashSet<_> = JobStatus::all().iter().map(|s| s.style().label).collect();
        let colors: HashSet<_> = JobStatus::all().iter().map(|s| s.style().color).collect();
        let badges: HashSet<_> = JobStatus::all().iter().map(|s| s.style().badge).collect();
        assert_eq!(labels.len(), 7);
        assert_eq!(colors.len(), 7);
        assert_eq!(badges.len(), 7);
        assert_eq!(JobStatus::InProgress.label(), "In Progress");
        assert_eq!(JobStatus::Cancelled.style().color, "#9ca3af");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn status_groups() {
        let pipeline: Vec<_> = JobStatus::all().iter().filter(|s| s.is_pipeline()).collect();
        assert_eq!(pipeline.len(), 4);
        assert!(JobStatus::Paid.is_done());
        assert!(!JobStatus::Cancelled.is_done());
        assert!(!JobStatus::Cancelled.is_pipeline());
        assert!(JobStatus::Scheduled.is_active());
        assert!(!JobStatus::board().contains(&JobStatus::Cancelled));
    }

    #[test]
    fn lead_only_gets_the_two_edges() {
        let me = lead("crew-1");
        for status in JobStatus::all() {
            let j = job("j", *status, Some("crew-1"));
            let targets: Vec<_> = available_transitions(&me, &j)
                .into_iter()
                .map(|t| t.next)
                .collect();
            match status {
                JobStatus::Scheduled => assert_eq!(targets, vec![JobStatus::InProgress]),
                JobStatus::InProgress => assert_eq!(targets, vec![JobStatus::Completed]),
                _ => assert!(targets.is_empty(), "{status} should offer nothing"),
            }
        }
    }

    #[test]
    fn lead_edges_carry_button_labels() {
        let me = lead("crew-1");
        let j = job("j", JobStatus::Scheduled, Some("crew-1"));
        assert_eq!(available_transitions(&me, &j)[0].label, "Start Work");
    }

    #[test]
    fn lead_gets_nothing_on_other_peoples_jobs() {
        let me = lead("crew-1");
        let j = job("j", JobStatus::Scheduled, Some("crew-2"));
        assert!(available_transitions(&me, &j).is_empty());
        let err = authorize_transition(&me, &j, JobStatus::InProgress).unwrap_err();
        assert!(matches!(err, TileError::Unauthorized(_)));
    }

    #[test]
    fn lead_cannot_skip_edges() {
        let me = lead("crew-1");
        let j = job("j", JobStatus::Scheduled, Some("crew-1"));
        let err = authorize_transition(&me, &j, JobStatus::Paid).unwrap_err();
        assert!(matches!(err, TileError::InvalidTransition { .. }));
        assert!(authorize_transition(&me, &j, JobStatus::InProgress).is_ok());
    }

    #[test]
    fn owner_may_move_anywhere() {
        let boss = owner("boss");
        let j = job("j", JobStatus::Paid, None);
        assert_eq!(available_transitions(&boss, &j).len(), 6);
        for target in JobStatus::all() {
            assert!(authorize_transition(&boss, &j, *target).is_ok());
        }
    }
}
