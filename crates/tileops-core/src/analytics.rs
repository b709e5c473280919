//! Aggregates over a job collection.
//!
//! Every function here is total: empty input, missing fields and zero
//! denominators produce 0, never a panic or NaN. Money sums go through cents.

use crate::dates::YearMonth;
use crate::model::{Job, JobWithAssignee, Profile};
use crate::money::{format_usd, from_cents, round_percent, to_cents};
use crate::status::JobStatus;
use chrono::NaiveDate;
use serde::Serialize;

fn sum_cents(values: impl Iterator<Item = Option<f64>>) -> f64 {
    from_cents(values.map(|v| to_cents(v.unwrap_or(0.0))).sum())
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ---------------------------------------------------------------------------
// Summary figures
// ---------------------------------------------------------------------------

/// Σ `amount_paid` over every job.
pub fn total_revenue(jobs: &[JobWithAssignee]) -> f64 {
    sum_cents(jobs.iter().map(|j| j.amount_paid))
}

/// Revenue divided by the number of jobs that have collected anything.
pub fn average_job_value(jobs: &[JobWithAssignee]) -> f64 {
    let paying = jobs
        .iter()
        .filter(|j| j.amount_paid.is_some_and(|p| p > 0.0))
        .count();
    if paying == 0 {
        return 0.0;
    }
    total_revenue(jobs) / paying as f64
}

/// Percentage of done jobs that finished within their estimated days.
/// Done jobs missing either day figure count against the rate.
pub fn on_time_rate(jobs: &[JobWithAssignee]) -> i64 {
    let done: Vec<_> = jobs.iter().filter(|j| j.status.is_done()).collect();
    let on_time = done
        .iter()
        .filter(|j| matches!((j.actual_days, j.estimated_days), (Some(a), Some(e)) if a <= e))
        .count();
    round_percent(on_time as f64, done.len() as f64)
}

/// Σ `estimated_cost` over lead, quoted, scheduled and in-progress jobs.
pub fn pipeline_value(jobs: &[JobWithAssignee]) -> f64 {
    sum_cents(
        jobs.iter()
            .filter(|j| j.status.is_pipeline())
            .map(|j| j.estimated_cost),
    )
}

// ---------------------------------------------------------------------------
// Variance
// ---------------------------------------------------------------------------

/// "$400 under budget" / "$1,200 over budget". Zero reads as under.
pub fn budget_label(estimated: f64, actual: f64) -> String {
    let variance = estimated - actual;
    let amount = format_usd(variance.abs(), 0);
    if variance >= 0.0 {
        format!("{amount} under budget")
    } else {
        format!("{amount} over budget")
    }
}

/// "On schedule" / "1 day ahead" / "2 days over estimate".
pub fn schedule_label(estimated_days: i64, actual_days: i64) -> String {
    match actual_days.saturating_sub(estimated_days) {
        0 => "On schedule".to_string(),
        d if d < 0 => {
            let ahead = d.saturating_neg();
            format!("{ahead} day{} ahead", plural(ahead))
        }
        d => format!("{d} day{} over estimate", plural(d)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetVariance {
    pub job_id: String,
    pub job_number: i64,
    pub title: String,
    pub estimated: f64,
    pub actual: f64,
    /// `estimated − actual`; positive means under budget.
    pub variance: f64,
    pub percent: i64,
    pub label: String,
}

impl BudgetVariance {
    pub fn of(job: &Job) -> Option<Self> {
        let (estimated, actual) = (job.estimated_cost?, job.actual_cost?);
        if estimated == 0.0 || actual == 0.0 {
            return None;
        }
        let variance = from_cents(to_cents(estimated) - to_cents(actual));
        Some(Self {
            job_id: job.id.clone(),
            job_number: job.job_number,
            title: job.title.clone(),
            estimated,
            actual,
            variance,
            percent: round_percent(variance, estimated),
            label: budget_label(estimated, actual),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleVariance {
    pub job_id: String,
    pub job_number: i64,
    pub title: String,
    pub estimated_days: i64,
    pub actual_days: i64,
    /// `actual − estimated`; negative means ahead.
    pub diff: i64,
    pub label: String,
}

impl ScheduleVariance {
    pub fn of(job: &Job) -> Option<Self> {
        let (estimated_days, actual_days) = (job.estimated_days?, job.actual_days?);
        Some(Self {
            job_id: job.id.clone(),
            job_number: job.job_number,
            title: job.title.clone(),
            estimated_days,
            actual_days,
            diff: actual_days.saturating_sub(estimated_days),
            label: schedule_label(estimated_days, actual_days),
        })
    }
}

/// Cost variance rows for done jobs with both (non-zero) costs recorded.
pub fn budget_variances(jobs: &[JobWithAssignee]) -> Vec<BudgetVariance> {
    jobs.iter()
        .filter(|j| j.status.is_done())
        .filter_map(|j| BudgetVariance::of(j))
        .collect()
}

/// Day variance rows for done jobs with both day counts recorded.
pub fn schedule_variances(jobs: &[JobWithAssignee]) -> Vec<ScheduleVariance> {
    jobs.iter()
        .filter(|j| j.status.is_done())
        .filter_map(|j| ScheduleVariance::of(j))
        .collect()
}

// ---------------------------------------------------------------------------
// Team workload & histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub profile_id: String,
    pub name: String,
    pub assigned: usize,
    pub active: usize,
    pub completed: usize,
}

/// One row per active team member, in `team` order.
pub fn team_workload(jobs: &[JobWithAssignee], team: &[Profile]) -> Vec<Workload> {
    team.iter()
        .filter(|p| p.is_active)
        .map(|member| {
            let mine: Vec<_> = jobs.iter().filter(|j| j.is_assigned_to(&member.id)).collect();
            Workload {
                profile_id: member.id.clone(),
                name: member.full_name.clone(),
                assigned: mine.len(),
                active: mine.iter().filter(|j| j.status.is_active()).count(),
                completed: mine.iter().filter(|j| j.status.is_done()).count(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBar {
    pub status: JobStatus,
    pub label: &'static str,
    pub value: usize,
    pub color: &'static str,
}

/// Job counts per status in canonical order.
pub fn status_histogram(jobs: &[JobWithAssignee], include_cancelled: bool) -> Vec<StatusBar> {
    let statuses = if include_cancelled {
        JobStatus::all()
    } else {
        JobStatus::board()
    };
    statuses
        .iter()
        .map(|&status| StatusBar {
            status,
            label: status.label(),
            value: jobs.iter().filter(|j| j.status == status).count(),
            color: status.style().color,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub completed_this_month: usize,
    pub revenue_this_month: f64,
}

/// The four cards above every dashboard view. "This month" is judged by the
/// job's last update.
pub fn dashboard_metrics(jobs: &[JobWithAssignee], today: NaiveDate) -> DashboardMetrics {
    let month_start = YearMonth::of(today).first_day();
    let finished: Vec<_> = jobs
        .iter()
        .filter(|j| j.status.is_done() && j.updated_at.date_naive() >= month_start)
        .collect();
    DashboardMetrics {
        total_jobs: jobs.len(),
        active_jobs: jobs.iter().filter(|j| j.status.is_active()).count(),
        completed_this_month: finished.len(),
        revenue_this_month: sum_cents(finished.iter().map(|j| j.amount_paid)),
    }
}

// ---------------------------------------------------------------------------
// Per-job figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFinancials {
    pub estimated: f64,
    pub actual: Option<f64>,
    pub invoiced: f64,
    pub paid: f64,
    /// Present only when something is still owed.
    pub balance_due: Option<f64>,
    /// `estimated − actual`, present once an actual cost is recorded.
    pub variance: Option<f64>,
    pub variance_label: Option<String>,
    pub overpaid: bool,
}

pub fn job_financials(job: &Job) -> JobFinancials {
    let estimated = job.estimated_cost.unwrap_or(0.0);
    let invoiced = job.amount_invoiced.unwrap_or(0.0);
    let paid = job.amount_paid.unwrap_or(0.0);
    let balance = from_cents(to_cents(invoiced) - to_cents(paid));
    let variance = job
        .actual_cost
        .map(|actual| from_cents(to_cents(estimated) - to_cents(actual)));
    JobFinancials {
        estimated,
        actual: job.actual_cost,
        invoiced,
        paid,
        balance_due: (balance > 0.0).then_some(balance),
        variance,
        variance_label: job.actual_cost.map(|actual| budget_label(estimated, actual)),
        overpaid: job.payment_exceeds_invoiced(),
    }
}

/// Estimated vs actual for one dimension, with the actual bar as a share of
/// the estimate capped at 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub estimated: f64,
    pub actual: f64,
    pub ratio_percent: f64,
    pub within_estimate: bool,
    pub label: String,
}

fn capped_ratio(actual: f64, estimated: f64) -> f64 {
    if estimated == 0.0 || !actual.is_finite() || !estimated.is_finite() {
        return 0.0;
    }
    (actual / estimated * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPerformance {
    pub days: Option<Comparison>,
    pub cost: Option<Comparison>,
}

/// Performance panel for work that has started. `None` for jobs that have not
/// reached in-progress, or that carry neither day nor cost pairs.
pub fn job_performance(job: &Job) -> Option<JobPerformance> {
    if !matches!(
        job.status,
        JobStatus::InProgress | JobStatus::Completed | JobStatus::Paid
    ) {
        return None;
    }
    let days = match (job.estimated_days, job.actual_days) {
        (Some(est), Some(act)) => Some(Comparison {
            estimated: est as f64,
            actual: act as f64,
            ratio_percent: capped_ratio(act as f64, est as f64),
            within_estimate: act <= est,
            label: schedule_label(est, act),
        }),
        _ => None,
    };
    let cost = match (job.estimated_cost, job.actual_cost) {
        (Some(est), Some(act)) => Some(Comparison {
            estimated: est,
            actual: act,
            ratio_percent: capped_ratio(act, est),
            within_estimate: act <= est,
            label: budget_label(est, act),
        }),
        _ => None,
    };
    if days.is_none() && cost.is_none() {
        return None;
    }
    Some(JobPerformance { days, cost })
}

// ---------------------------------------------------------------------------
// AnalyticsReport
// ---------------------------------------------------------------------------

/// Everything the analytics page shows, computed in one pass over the same
/// job collection the views use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_revenue: f64,
    pub average_job_value: f64,
    pub on_time_rate: i64,
    pub pipeline_value: f64,
    pub by_status: Vec<StatusBar>,
    pub budget: Vec<BudgetVariance>,
    pub schedule: Vec<ScheduleVariance>,
    pub workload: Vec<Workload>,
}

impl AnalyticsReport {
    pub fn build(jobs: &[JobWithAssignee], team: &[Profile]) -> Self {
        Self {
            total_revenue: total_revenue(jobs),
            average_job_value: average_job_value(jobs),
            on_time_rate: on_time_rate(jobs),
            pipeline_value: pipeline_value(jobs),
            by_status: status_histogram(jobs, false),
            budget: budget_variances(jobs),
            schedule: schedule_variances(jobs),
            workload: team_workload(jobs, team),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
