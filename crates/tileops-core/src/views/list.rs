use crate::model::{JobWithAssignee, Profile};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    #[serde(flatten)]
    pub job: JobWithAssignee,
    pub status_label: &'static str,
    pub badge: &'static str,
    /// A crew lead's own job, marked so it stands out in the full list.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobList {
    pub rows: Vec<ListRow>,
    pub mine_only: bool,
    /// Crew leads get an "All Jobs / My Jobs" toggle; owners do not.
    pub show_filter: bool,
    pub empty_message: Option<&'static str>,
}

impl JobList {
    /// Rows keep the input order.
    pub fn build(jobs: &[JobWithAssignee], actor: &Profile, mine_only: bool) -> Self {
        let is_owner = actor.is_owner();
        let rows: Vec<_> = jobs
            .iter()
            .filter(|j| !mine_only || j.is_assigned_to(&actor.id))
            .map(|j| {
                let style = j.status.style();
                ListRow {
                    job: j.clone(),
                    status_label: style.label,
                    badge: style.badge,
                    highlighted: !is_owner && j.is_assigned_to(&actor.id),
                }
            })
            .collect();
        let empty_message = rows.is_empty().then_some(if mine_only {
            "No jobs assigned to you."
        } else {
            "No jobs yet."
        });
        Self {
            rows,
            mine_only,
            show_filter: !is_owner,
            empty_message,
        }
    }
}
