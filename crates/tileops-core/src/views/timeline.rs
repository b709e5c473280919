//! Gantt-style timeline: one row per crew member across a month plus a week
//! either side.

use crate::dates::{add_days, days_between, is_weekend, weekday_letter, YearMonth};
use crate::model::{JobWithAssignee, Profile};
use crate::status::JobStatus;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Days of context shown before the 1st and after the last day of the month.
pub const WINDOW_PAD_DAYS: i64 = 7;

pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayHeader {
    pub date: NaiveDate,
    pub letter: &'static str,
    pub day: u32,
    pub is_today: bool,
    pub is_weekend: bool,
}

/// A bar in day units relative to the window start. `offset + span` never
/// exceeds the window length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBar {
    pub job_id: String,
    pub job_number: i64,
    pub title: String,
    pub status: JobStatus,
    pub fill: &'static str,
    pub offset: i64,
    pub span: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    /// `None` for the unassigned row.
    pub profile_id: Option<String>,
    pub name: String,
    /// Scheduled jobs in this row, including any that fall outside the
    /// window and so have no bar.
    pub job_count: usize,
    pub bars: Vec<TimelineBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub month: YearMonth,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
    pub days: Vec<DayHeader>,
    pub rows: Vec<TimelineRow>,
    /// Present only when today lies inside the window.
    pub today_offset: Option<i64>,
}

/// First and last day (inclusive) shown for `month`.
pub fn window(month: YearMonth) -> (NaiveDate, NaiveDate) {
    (
        add_days(month.first_day(), -WINDOW_PAD_DAYS),
        add_days(month.last_day(), WINDOW_PAD_DAYS),
    )
}

/// Place `job` on a window starting at `start` that is `total_days` long.
/// Unscheduled jobs and jobs entirely outside the window have no bar.
pub fn bar_for(job: &JobWithAssignee, start: NaiveDate, total_days: i64) -> Option<TimelineBar> {
    let job_start = days_between(start, job.scheduled_start?);
    let job_end = match job.scheduled_end {
        Some(end) => days_between(start, end),
        None => job_start
            .saturating_add(job.estimated_days.unwrap_or(1))
            .saturating_sub(1),
    }
    .max(job_start);

    if job_end < 0 || job_start > total_days - 1 {
        return None;
    }
    let left = job_start.max(0);
    let right = job_end.min(total_days - 1);
    Some(TimelineBar {
        job_id: job.id.clone(),
        job_number: job.job_number,
        title: job.title.clone(),
        status: job.status,
        fill: job.status.style().fill,
        offset: left,
        span: (right - left + 1).max(1),
    })
}

fn row(
    profile_id: Option<String>,
    name: String,
    jobs: Vec<&JobWithAssignee>,
    start: NaiveDate,
    total_days: i64,
) -> TimelineRow {
    TimelineRow {
        profile_id,
        name,
        job_count: jobs.len(),
        bars: jobs
            .into_iter()
            .filter_map(|j| bar_for(j, start, total_days))
            .collect(),
    }
}

impl Timeline {
    pub fn build(
        jobs: &[JobWithAssignee],
        team: &[Profile],
        month: YearMonth,
        today: NaiveDate,
    ) -> Self {
        let (start, end) = window(month);
        let total_days = days_between(start, end) + 1;

        let days = (0..total_days)
            .map(|i| {
                let date = add_days(start, i);
                DayHeader {
                    date,
                    letter: weekday_letter(date),
                    day: date.day(),
                    is_today: date == today,
                    is_weekend: is_weekend(date),
                }
            })
            .collect();

        let scheduled: Vec<_> = jobs.iter().filter(|j| j.scheduled_start.is_some()).collect();

        let mut rows: Vec<_> = team
            .iter()
            .filter(|p| p.is_active)
            .map(|member| {
                let mine = scheduled
                    .iter()
                    .copied()
                    .filter(|j| j.is_assigned_to(&member.id))
                    .collect();
                row(
                    Some(member.id.clone()),
                    member.full_name.clone(),
                    mine,
                    start,
                    total_days,
                )
            })
            .collect();

        let unassigned: Vec<_> = scheduled
            .iter()
            .copied()
            .filter(|j| j.assigned_to.is_none())
            .collect();
        if !unassigned.is_empty() {
            rows.push(row(None, UNASSIGNED.to_string(), unassigned, start, total_days));
        }

        let offset = days_between(start, today);
        Self {
            month,
            start,
            end,
            total_days,
            days,
            rows,
            today_offset: (0..total_days).contains(&offset).then_some(offset),
        }
    }
}
