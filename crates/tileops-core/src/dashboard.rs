//! The operations every surface (HTTP, CLI) runs, on top of a [`JobStore`].
//!
//! Reads degrade: a failing list read logs a warning and yields an empty
//! collection, and a failing single-row read is reported as not found. Writes
//! propagate their errors.

use crate::analytics::{
    dashboard_metrics, job_financials, job_performance, AnalyticsReport, DashboardMetrics,
    JobFinancials, JobPerformance,
};
use crate::error::{Result, TileError};
use crate::invoice::{Invoice, InvoiceFilter, InvoiceStatus, InvoiceWithJob, NewInvoice};
use crate::model::{JobPhoto, JobWithAssignee, Profile};
use crate::status::{authorize_transition, available_transitions, JobStatus, TransitionOption};
use crate::store::{DataMode, JobStore, DEMO_OWNER_ID};
use crate::team_map::TeamMap;
use crate::validation::NewJob;
use crate::views::{project, RequestStatusChange, StatusChangeOutcome, View, ViewRequest};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub mode: DataMode,
    pub actor: Profile,
    pub metrics: DashboardMetrics,
    pub view: View,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub job: JobWithAssignee,
    pub creator: Option<Profile>,
    pub status_label: &'static str,
    pub badge: &'static str,
    pub financials: JobFinancials,
    pub performance: Option<JobPerformance>,
    pub invoices: Vec<Invoice>,
    pub photos: Vec<JobPhoto>,
    /// Status changes this actor may make; never contains a rejected edge.
    pub transitions: Vec<TransitionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    #[serde(flatten)]
    pub invoice: InvoiceWithJob,
    /// Stored status with overdue derived from the due date.
    pub effective_status: InvoiceStatus,
    pub status_label: &'static str,
    pub badge: &'static str,
}

impl InvoiceRow {
    pub fn new(invoice: InvoiceWithJob, today: NaiveDate) -> Self {
        let effective_status = invoice.effective_status(today);
        Self {
            invoice,
            effective_status,
            status_label: effective_status.label(),
            badge: effective_status.badge(),
        }
    }
}

impl std::ops::Deref for InvoiceRow {
    type Target = InvoiceWithJob;

    fn deref(&self) -> &InvoiceWithJob {
        &self.invoice
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceList {
    /// Count before filtering.
    pub total: usize,
    pub filter: InvoiceFilter,
    pub invoices: Vec<InvoiceRow>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    store: Arc<dyn JobStore>,
}

fn or_empty<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "could not load {what}, showing none");
            Vec::new()
        }
    }
}

/// Backend failures on a single-row read surface as `missing`.
fn or_missing<T>(result: Result<T>, missing: impl FnOnce() -> TileError) -> Result<T> {
    result.map_err(|e| match e {
        TileError::Backend(msg) => {
            tracing::warn!(error = %msg, "single read failed, treating as not found");
            missing()
        }
        other => other,
    })
}

fn require_owner(actor: &Profile, action: &str) -> Result<()> {
    if actor.is_owner() {
        Ok(())
    } else {
        Err(TileError::Unauthorized(format!(
            "only the owner may {action}"
        )))
    }
}

fn warn_if_overpaid(job: &JobWithAssignee) {
    if job.payment_exceeds_invoiced() {
        tracing::warn!(
            job = job.job_number,
            paid = job.amount_paid.unwrap_or(0.0),
            invoiced = job.amount_invoiced.unwrap_or(0.0),
            "amount paid exceeds amount invoiced"
        );
    }
}

impl Dashboard {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub fn mode(&self) -> DataMode {
        self.store.mode()
    }

    /// The profile a request acts as. Demo mode falls back to the demo owner;
    /// live mode requires a known profile id.
    pub fn resolve_actor(&self, profile_id: Option<&str>) -> Result<Profile> {
        let id = match (profile_id.map(str::trim).filter(|s| !s.is_empty()), self.mode()) {
            (Some(id), _) => id,
            (None, DataMode::Demo) => DEMO_OWNER_ID,
            (None, DataMode::Live) => {
                return Err(TileError::Unauthorized("no profile given".to_string()))
            }
        };
        match self.store.get_profile(id) {
            Ok(p) if p.is_active => Ok(p),
            Ok(_) => Err(TileError::Unauthorized(format!("profile {id} is inactive"))),
            Err(e) if e.is_not_found() => {
                Err(TileError::Unauthorized(format!("unknown profile {id}")))
            }
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Jobs and views
    // -----------------------------------------------------------------------

    pub fn jobs(&self) -> Vec<JobWithAssignee> {
        let jobs = or_empty("jobs", self.store.list_jobs());
        jobs.iter().for_each(warn_if_overpaid);
        jobs
    }

    pub fn team(&self) -> Vec<Profile> {
        or_empty("team", self.store.list_team())
    }

    /// One projection over the shared job collection.
    pub fn view(&self, actor: &Profile, request: &ViewRequest, today: NaiveDate) -> View {
        let jobs = self.jobs();
        let team = self.team();
        project(request, &jobs, &team, actor, today)
    }

    /// Metric cards plus the requested view, both from one read.
    pub fn overview(&self, actor: &Profile, request: &ViewRequest, today: NaiveDate) -> Overview {
        let jobs = self.jobs();
        let team = self.team();
        Overview {
            mode: self.mode(),
            actor: actor.clone(),
            metrics: dashboard_metrics(&jobs, today),
            view: project(request, &jobs, &team, actor, today),
        }
    }

    pub fn analytics(&self) -> AnalyticsReport {
        AnalyticsReport::build(&self.jobs(), &self.team())
    }

    pub fn job(&self, id: &str) -> Result<JobWithAssignee> {
        or_missing(self.store.get_job(id), || TileError::JobNotFound(id.to_string()))
    }

    pub fn job_detail(&self, actor: &Profile, id: &str) -> Result<JobDetail> {
        let job = self.job(id)?;
        warn_if_overpaid(&job);
        let creator = job
            .created_by
            .as_deref()
            .and_then(|cid| self.store.get_profile(cid).ok());
        let style = job.status.style();
        Ok(JobDetail {
            creator,
            status_label: style.label,
            badge: style.badge,
            financials: job_financials(&job),
            performance: job_performance(&job),
            invoices: or_empty("invoices", self.store.invoices_for_job(id)),
            photos: or_empty("photos", self.store.photos_for_job(id)),
            transitions: available_transitions(actor, &job),
            job,
        })
    }

    pub fn create_job(&self, actor: &Profile, job: NewJob) -> Result<JobWithAssignee> {
        require_owner(actor, "create jobs")?;
        job.validate()?;
        let created = self.store.create_job(job, &actor.id)?;
        tracing::info!(id = %created.id, number = created.job_number, "job created");
        Ok(created)
    }

    /// Move a job to `target` on behalf of `actor`, enforcing the role rules.
    pub fn change_status(
        &self,
        actor: &Profile,
        job_id: &str,
        target: JobStatus,
    ) -> Result<JobWithAssignee> {
        let job = self.job(job_id)?;
        if job.status == target {
            return Err(TileError::InvalidTransition {
                from: job.status.to_string(),
                to: target.to_string(),
                reason: "job is already in that status".to_string(),
            });
        }
        authorize_transition(actor, &job, target)?;
        let updated = self.store.update_job_status(job_id, target)?;
        tracing::info!(
            job = updated.job_number,
            from = %job.status,
            to = %target,
            actor = %actor.id,
            "status changed"
        );
        Ok(updated)
    }

    /// Settle a board drag. Every failure becomes a `Rejected` outcome.
    pub fn request_status_change(&self, request: &RequestStatusChange) -> StatusChangeOutcome {
        let result = self
            .resolve_actor(Some(&request.actor))
            .and_then(|actor| self.change_status(&actor, &request.job_id, request.new_status));
        match result {
            Ok(job) => StatusChangeOutcome::Confirmed { job },
            Err(e) => {
                tracing::info!(job = %request.job_id, error = %e, "status change rejected");
                StatusChangeOutcome::Rejected {
                    job_id: request.job_id.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Invoices
    // -----------------------------------------------------------------------

    pub fn invoices(&self, actor: &Profile, filter: InvoiceFilter, today: NaiveDate) -> Result<InvoiceList> {
        require_owner(actor, "view invoices")?;
        let all = or_empty("invoices", self.store.list_invoices());
        let total = all.len();
        let invoices = all
            .into_iter()
            .filter(|inv| filter.matches(inv, today))
            .map(|inv| InvoiceRow::new(inv, today))
            .collect();
        Ok(InvoiceList {
            total,
            filter,
            invoices,
        })
    }

    pub fn invoice(&self, actor: &Profile, id: &str, today: NaiveDate) -> Result<InvoiceRow> {
        require_owner(actor, "view invoices")?;
        let invoice = or_missing(self.store.get_invoice(id), || {
            TileError::InvoiceNotFound(id.to_string())
        })?;
        Ok(InvoiceRow::new(invoice, today))
    }

    pub fn create_invoice(
        &self,
        actor: &Profile,
        invoice: NewInvoice,
        today: NaiveDate,
    ) -> Result<InvoiceRow> {
        require_owner(actor, "create invoices")?;
        invoice.validate()?;
        let created = self.store.create_invoice(invoice)?;
        if created.job.is_none() {
            tracing::warn!(
                number = %created.invoice_number,
                job_id = %created.job_id,
                "invoice refers to an unknown job"
            );
        }
        tracing::info!(number = %created.invoice_number, amount = created.amount, "invoice created");
        Ok(InvoiceRow::new(created, today))
    }

    pub fn send_invoice(&self, actor: &Profile, id: &str, now: DateTime<Utc>) -> Result<InvoiceRow> {
        self.move_invoice(actor, id, InvoiceStatus::Sent, now)
    }

    pub fn pay_invoice(&self, actor: &Profile, id: &str, now: DateTime<Utc>) -> Result<InvoiceRow> {
        self.move_invoice(actor, id, InvoiceStatus::Paid, now)
    }

    fn move_invoice(
        &self,
        actor: &Profile,
        id: &str,
        target: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Result<InvoiceRow> {
        require_owner(actor, "update invoices")?;
        let mut current = self.store.get_invoice(id)?.invoice;
        current.move_to(target, now)?;
        let updated = self.store.update_invoice_status(id, target)?;
        tracing::info!(number = %updated.invoice_number, status = %target, "invoice updated");
        Ok(InvoiceRow::new(updated, now.date_naive()))
    }

    // -----------------------------------------------------------------------
    // Team
    // -----------------------------------------------------------------------

    pub fn team_map(&self) -> TeamMap {
        let coordinates = match self.store.job_coordinates() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "could not load job coordinates");
                Default::default()
            }
        };
        TeamMap::build(&self.team(), &self.jobs(), &coordinates)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{pipeline_value, status_histogram, ScheduleVariance, BudgetVariance};
    use crate::invoice::LineItemInput;
    use crate::model::test_support::{date, ts};
    use crate::store::DemoStore;
    use crate::views::ViewKind;

    const LEAD_ID: &str = "demo-lead-id";

    fn dashboard() -> Dashboard {
        Dashboard::new(Arc::new(DemoStore::new().unwrap()))
    }

    fn owner(d: &Dashboard) -> Profile {
        d.resolve_actor(None).unwrap()
    }

    fn lead(d: &Dashboard) -> Profile {
        d.resolve_actor(Some(LEAD_ID)).unwrap()
    }

    #[test]
    fn demo_defaults_to_the_owner() {
        let d = dashboard();
        assert_eq!(owner(&d).id, DEMO_OWNER_ID);
        assert!(matches!(
            d.resolve_actor(Some("stranger")),
            Err(TileError::Unauthorized(_))
        ));
    }

    #[test]
    fn demo_histogram_has_one_job_per_status() {
        let jobs = dashboard().jobs();
        let bars = status_histogram(&jobs, false);
        assert_eq!(bars.len(), 6);
        assert!(bars.iter().all(|b| b.value == 1), "{bars:?}");
        assert_eq!(pipeline_value(&jobs), 17300.0);
    }

    #[test]
    fn demo_completed_job_variances() {
        let d = dashboard();
        let job = d.job("demo-job-5").unwrap();
        let schedule = ScheduleVariance::of(&job).unwrap();
        assert_eq!(schedule.diff, -1);
        assert_eq!(schedule.label, "1 day ahead");
        let budget = BudgetVariance::of(&job).unwrap();
        assert_eq!(budget.variance, 400.0);
        assert_eq!(budget.label, "$400 under budget");
    }

    #[test]
    fn overview_carries_metrics_and_view() {
        let d = dashboard();
        let actor = owner(&d);
        let request = ViewRequest {
            kind: ViewKind::Kanban,
            ..Default::default()
        };
        let overview = d.overview(&actor, &request, date("2025-02-12"));
        assert_eq!(overview.mode, DataMode::Demo);
        assert_eq!(overview.metrics.total_jobs, 6);
        assert_eq!(overview.view.kind(), ViewKind::Kanban);
    }

    #[test]
    fn lead_cannot_move_someone_elses_job() {
        let d = dashboard();
        let outcome = d.request_status_change(&RequestStatusChange {
            job_id: "demo-job-2".into(),
            new_status: JobStatus::InProgress,
            actor: LEAD_ID.into(),
        });
        assert!(!outcome.is_confirmed());
        assert_eq!(d.job("demo-job-2").unwrap().status, JobStatus::Scheduled);
    }

    #[test]
    fn lead_completes_own_job() {
        let d = dashboard();
        let outcome = d.request_status_change(&RequestStatusChange {
            job_id: "demo-job-1".into(),
            new_status: JobStatus::Completed,
            actor: LEAD_ID.into(),
        });
        assert!(outcome.is_confirmed());
        assert_eq!(d.job("demo-job-1").unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn lead_cannot_skip_steps_on_own_job() {
        let d = dashboard();
        let err = d
            .change_status(&lead(&d), "demo-job-1", JobStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, TileError::InvalidTransition { .. }));
    }

    #[test]
    fn same_status_is_rejected() {
        let d = dashboard();
        let err = d
            .change_status(&owner(&d), "demo-job-1", JobStatus::InProgress)
            .unwrap_err();
        assert!(matches!(err, TileError::InvalidTransition { .. }));
    }

    #[test]
    fn detail_offers_only_allowed_transitions() {
        let d = dashboard();
        let detail = d.job_detail(&lead(&d), "demo-job-1").unwrap();
        let next: Vec<_> = detail.transitions.iter().map(|t| t.next).collect();
        assert_eq!(next, vec![JobStatus::Completed]);
        assert_eq!(detail.invoices.len(), 2);
        assert_eq!(detail.creator.map(|p| p.id), Some(DEMO_OWNER_ID.to_string()));

        let other = d.job_detail(&lead(&d), "demo-job-2").unwrap();
        assert!(other.transitions.is_empty());
    }

    #[test]
    fn only_the_owner_creates_jobs() {
        let d = dashboard();
        let new_job = NewJob {
            title: "Entry Floor".into(),
            client_name: "Dana Park".into(),
            ..Default::default()
        };
        assert!(matches!(
            d.create_job(&lead(&d), new_job.clone()),
            Err(TileError::Unauthorized(_))
        ));
        let created = d.create_job(&owner(&d), new_job).unwrap();
        assert_eq!(created.status, JobStatus::Lead);
        assert_eq!(d.jobs().len(), 7);
    }

    #[test]
    fn invalid_job_is_not_stored() {
        let d = dashboard();
        let err = d.create_job(&owner(&d), NewJob::default()).unwrap_err();
        assert!(matches!(err, TileError::Validation(_)));
        assert_eq!(d.jobs().len(), 6);
    }

    #[test]
    fn oversized_estimate_is_rejected_and_timeline_still_renders() {
        let d = dashboard();
        let actor = owner(&d);
        let mut new_job = NewJob {
            title: "Lobby Floor".into(),
            client_name: "Dana Park".into(),
            scheduled_start: Some(date("2025-02-10")),
            estimated_days: Some(i64::MAX),
            ..Default::default()
        };
        let err = d.create_job(&actor, new_job.clone()).unwrap_err();
        assert!(matches!(err, TileError::Validation(_)));

        new_job.estimated_days = Some(crate::validation::MAX_ESTIMATED_DAYS);
        let created = d.create_job(&actor, new_job).unwrap();
        let request = ViewRequest {
            kind: ViewKind::Timeline,
            month: Some("2025-02".parse().unwrap()),
            ..Default::default()
        };
        let View::Timeline(timeline) = d.view(&actor, &request, date("2025-02-12")) else {
            panic!("expected a timeline");
        };
        let bar = timeline
            .rows
            .iter()
            .flat_map(|r| &r.bars)
            .find(|b| b.job_id == created.id)
            .unwrap();
        assert_eq!(bar.offset + bar.span, timeline.total_days);
    }

    #[test]
    fn invoice_list_filters_on_derived_overdue() {
        let d = dashboard();
        let actor = owner(&d);
        let overdue = d
            .invoices(&actor, InvoiceFilter::Status(InvoiceStatus::Overdue), date("2025-03-10"))
            .unwrap();
        assert_eq!(overdue.total, 5);
        assert_eq!(overdue.invoices.len(), 1);
        assert_eq!(overdue.invoices[0].invoice.invoice_number, "INV-2025-005");
        assert_eq!(overdue.invoices[0].badge, "bg-red-100 text-red-800");

        let before = d
            .invoices(&actor, InvoiceFilter::Status(InvoiceStatus::Overdue), date("2025-02-12"))
            .unwrap();
        assert!(before.invoices.is_empty());
    }

    #[test]
    fn leads_cannot_see_invoices() {
        let d = dashboard();
        assert!(matches!(
            d.invoices(&lead(&d), InvoiceFilter::All, date("2025-02-12")),
            Err(TileError::Unauthorized(_))
        ));
    }

    #[test]
    fn invoice_lifecycle() {
        let d = dashboard();
        let actor = owner(&d);
        let created = d
            .create_invoice(
                &actor,
                NewInvoice {
                    job_id: "demo-job-2".into(),
                    due_date: Some(date("2025-03-15")),
                    line_items: vec![LineItemInput {
                        description: "Subway tile install".into(),
                        quantity: 2.0,
                        unit_price: 1400.0,
                    }],
                    discount: None,
                },
                date("2025-02-12"),
            )
            .unwrap();
        assert_eq!(created.effective_status, InvoiceStatus::Draft);
        assert_eq!(created.invoice.amount, 2800.0);

        let id = created.invoice.id.clone();
        assert!(matches!(
            d.pay_invoice(&actor, &id, ts(2025, 2, 13)),
            Err(TileError::InvalidTransition { .. })
        ));
        let sent = d.send_invoice(&actor, &id, ts(2025, 2, 13)).unwrap();
        assert_eq!(sent.effective_status, InvoiceStatus::Sent);
        let paid = d.pay_invoice(&actor, &id, ts(2025, 2, 20)).unwrap();
        assert_eq!(paid.effective_status, InvoiceStatus::Paid);
    }

    #[test]
    fn invoice_for_missing_job_has_no_job() {
        let d = dashboard();
        let row = d
            .create_invoice(
                &owner(&d),
                NewInvoice {
                    job_id: "ghost".into(),
                    due_date: Some(date("2025-03-15")),
                    line_items: vec![LineItemInput {
                        description: "Consult".into(),
                        quantity: 1.0,
                        unit_price: 150.0,
                    }],
                    discount: None,
                },
                date("2025-02-12"),
            )
            .unwrap();
        assert!(row.job.is_none());
        assert_eq!(row.job_id, "ghost");
        assert_eq!(row.amount, 150.0);
    }

    #[test]
    fn team_map_has_demo_markers() {
        let map = dashboard().team_map();
        assert_eq!(map.members.len(), 2);
        assert_eq!(map.jobs.len(), 6);
    }
}
