//! The four presentations of one job collection.
//!
//! Every projection takes the same `&[JobWithAssignee]` and reads status
//! presentation only from [`JobStatus::style`](crate::status::JobStatus::style).

pub mod calendar;
pub mod kanban;
pub mod list;
pub mod timeline;

pub use calendar::CalendarMonth;
pub use kanban::{KanbanBoard, MoveState, RequestStatusChange, StatusChangeOutcome};
pub use list::JobList;
pub use timeline::Timeline;

use crate::dates::YearMonth;
use crate::model::{JobWithAssignee, Profile};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    List,
    Kanban,
    Calendar,
    Timeline,
}

impl ViewKind {
    pub fn all() -> &'static [ViewKind] {
        &[
            ViewKind::List,
            ViewKind::Kanban,
            ViewKind::Calendar,
            ViewKind::Timeline,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::List => "list",
            ViewKind::Kanban => "kanban",
            ViewKind::Calendar => "calendar",
            ViewKind::Timeline => "timeline",
        }
    }

    /// Lenient parse for query strings: anything unrecognised is the list.
    pub fn parse(s: Option<&str>) -> ViewKind {
        match s.map(str::trim) {
            Some("kanban") => ViewKind::Kanban,
            Some("calendar") => ViewKind::Calendar,
            Some("timeline") => ViewKind::Timeline,
            _ => ViewKind::List,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asked to see.
#[derive(Debug, Clone, Default)]
pub struct ViewRequest {
    pub kind: ViewKind,
    /// List only: restrict to jobs assigned to the actor.
    pub mine_only: bool,
    /// Calendar and timeline: the month to show; defaults to today's.
    pub month: Option<YearMonth>,
}

/// A rendered projection, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    List(JobList),
    Kanban(KanbanBoard),
    Calendar(CalendarMonth),
    Timeline(Timeline),
}

impl View {
    pub fn kind(&self) -> ViewKind {
        match self {
            View::List(_) => ViewKind::List,
            View::Kanban(_) => ViewKind::Kanban,
            View::Calendar(_) => ViewKind::Calendar,
            View::Timeline(_) => ViewKind::Timeline,
        }
    }
}

pub fn project(
    request: &ViewRequest,
    jobs: &[JobWithAssignee],
    team: &[Profile],
    actor: &Profile,
    today: NaiveDate,
) -> View {
    let month = request.month.unwrap_or_else(|| YearMonth::of(today));
    match request.kind {
        ViewKind::List => View::List(JobList::build(jobs, actor, request.mine_only)),
        ViewKind::Kanban => View::Kanban(KanbanBoard::build(jobs, actor)),
        ViewKind::Calendar => View::Calendar(CalendarMonth::build(jobs, month, today)),
        ViewKind::Timeline => View::Timeline(Timeline::build(jobs, team, month, today)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{date, owner};

    #[test]
    fn unknown_view_falls_back_to_list() {
        assert_eq!(ViewKind::parse(Some("kanban")), ViewKind::Kanban);
        assert_eq!(ViewKind::parse(Some("gantt")), ViewKind::List);
        assert_eq!(ViewKind::parse(Some("")), ViewKind::List);
        assert_eq!(ViewKind::parse(None), ViewKind::List);
    }

    #[test]
    fn project_tags_the_output() {
        let boss = owner("boss");
        for kind in ViewKind::all() {
            let request = ViewRequest {
                kind: *kind,
                ..Default::default()
            };
            let view = project(&request, &[], &[], &boss, date("2025-02-10"));
            assert_eq!(view.kind(), *kind);
            let json = serde_json::to_value(&view).unwrap();
            assert_eq!(json["kind"], kind.as_str());
        }
    }
}
