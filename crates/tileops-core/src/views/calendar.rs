use crate::dates::{weekday_column, YearMonth};
use crate::model::JobWithAssignee;
use crate::status::JobStatus;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Chips shown per day before the rest collapse into "+N more".
pub const CHIPS_PER_DAY: usize = 3;

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarChip {
    pub job_id: String,
    pub job_number: i64,
    pub title: String,
    pub status: JobStatus,
    pub fill: &'static str,
}

impl CalendarChip {
    fn of(job: &JobWithAssignee) -> Self {
        Self {
            job_id: job.id.clone(),
            job_number: job.job_number,
            title: job.title.clone(),
            status: job.status,
            fill: job.status.style().fill,
        }
    }
}

/// One grid cell. Padding cells before the 1st and after the last day have
/// no date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub date: Option<NaiveDate>,
    pub day: Option<u32>,
    pub is_today: bool,
    pub chips: Vec<CalendarChip>,
    pub overflow: usize,
}

impl CalendarCell {
    fn padding() -> Self {
        Self {
            date: None,
            day: None,
            is_today: false,
            chips: Vec::new(),
            overflow: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    pub month: YearMonth,
    pub label: String,
    pub weekdays: [&'static str; 7],
    /// Whole weeks, Sunday first.
    pub weeks: Vec<Vec<CalendarCell>>,
    pub prev: YearMonth,
    pub next: YearMonth,
    /// The month containing today, for the "Today" button.
    pub today: YearMonth,
}

/// Jobs whose scheduled span covers `date`, in input order.
pub fn jobs_on(jobs: &[JobWithAssignee], date: NaiveDate) -> Vec<&JobWithAssignee> {
    jobs.iter().filter(|j| j.occupies(date)).collect()
}

impl CalendarMonth {
    pub fn build(jobs: &[JobWithAssignee], month: YearMonth, today: NaiveDate) -> Self {
        let mut cells: Vec<CalendarCell> = Vec::with_capacity(42);
        let lead_in = weekday_column(month.first_day()) as usize;
        cells.extend((0..lead_in).map(|_| CalendarCell::padding()));

        for day in 1..=month.days_in_month() {
            let Some(date) = month.day(day) else {
                continue;
            };
            let on_day = jobs_on(jobs, date);
            cells.push(CalendarCell {
                date: Some(date),
                day: Some(date.day()),
                is_today: date == today,
                chips: on_day
                    .iter()
                    .take(CHIPS_PER_DAY)
                    .map(|j| CalendarChip::of(j))
                    .collect(),
                overflow: on_day.len().saturating_sub(CHIPS_PER_DAY),
            });
        }
        while cells.len() % 7 != 0 {
            cells.push(CalendarCell::padding());
        }

        let weeks = cells.chunks(7).map(|w| w.to_vec()).collect();
        Self {
            month,
            label: month.label(),
            weekdays: WEEKDAY_NAMES,
            weeks,
            prev: month.prev(),
            next: month.next(),
            today: YearMonth::of(today),
        }
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.weeks
            .iter()
            .flatten()
            .find(|c| c.date == Some(date))
    }
}
