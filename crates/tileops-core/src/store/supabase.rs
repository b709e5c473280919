//! Live store over Supabase's PostgREST interface.

use super::{DataMode, JobStore};
use crate::error::{Result, TileError};
use crate::invoice::{
    next_invoice_number, numbering_year, Invoice, InvoiceStatus, InvoiceWithJob, LineItem,
    NewInvoice,
};
use crate::model::{sort_for_dashboard, GeoPoint, Job, JobPhoto, JobWithAssignee, Profile};
use crate::status::JobStatus;
use crate::validation::NewJob;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

const JOBS: &str = "jobs";
const PROFILES: &str = "profiles";
const INVOICES: &str = "invoices";
const PHOTOS: &str = "job_photos";

pub struct SupabaseStore {
    base_url: String,
    key: String,
    client: Client,
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// Row sent on job insert. The database assigns id, number and timestamps.
#[derive(Debug, Serialize)]
struct JobInsert<'a> {
    title: &'a str,
    status: JobStatus,
    client_name: &'a str,
    client_phone: Option<&'a str>,
    client_email: Option<&'a str>,
    client_address: Option<&'a str>,
    job_type: Option<&'a str>,
    square_footage: Option<f64>,
    scope_notes: Option<&'a str>,
    scheduled_start: Option<NaiveDate>,
    scheduled_end: Option<NaiveDate>,
    estimated_days: Option<i64>,
    actual_days: Option<i64>,
    estimated_cost: Option<f64>,
    actual_cost: Option<f64>,
    amount_invoiced: Option<f64>,
    amount_paid: Option<f64>,
    assigned_to: Option<&'a str>,
    notes: Option<&'a str>,
    created_by: Option<&'a str>,
}

impl<'a> From<&'a Job> for JobInsert<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            title: &job.title,
            status: job.status,
            client_name: &job.client_name,
            client_phone: job.client_phone.as_deref(),
            client_email: job.client_email.as_deref(),
            client_address: job.client_address.as_deref(),
            job_type: job.job_type.as_deref(),
            square_footage: job.square_footage,
            scope_notes: job.scope_notes.as_deref(),
            scheduled_start: job.scheduled_start,
            scheduled_end: job.scheduled_end,
            estimated_days: job.estimated_days,
            actual_days: job.actual_days,
            estimated_cost: job.estimated_cost,
            actual_cost: job.actual_cost,
            amount_invoiced: job.amount_invoiced,
            amount_paid: job.amount_paid,
            assigned_to: job.assigned_to.as_deref(),
            notes: job.notes.as_deref(),
            created_by: job.created_by.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InvoiceInsert<'a> {
    job_id: &'a str,
    invoice_number: &'a str,
    amount: f64,
    status: InvoiceStatus,
    due_date: NaiveDate,
    line_items: &'a [LineItem],
}

impl<'a> From<&'a Invoice> for InvoiceInsert<'a> {
    fn from(inv: &'a Invoice) -> Self {
        Self {
            job_id: &inv.job_id,
            invoice_number: &inv.invoice_number,
            amount: inv.amount,
            status: inv.status,
            due_date: inv.due_date,
            line_items: &inv.line_items,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusPatch<S> {
    status: S,
    updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// HTTP plumbing
// ---------------------------------------------------------------------------

/// PostgREST `in.(...)` list with each value quoted.
fn in_list<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = ids
        .into_iter()
        .map(|id| format!("\"{}\"", id.replace('"', "")))
        .collect();
    format!("in.({})", quoted.join(","))
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

impl SupabaseStore {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }

    fn check(table: &str, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        tracing::warn!(table, %status, "backend request failed");
        Err(TileError::Backend(format!("{table}: HTTP {status}: {body}")))
    }

    fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let req = self
            .authed(self.client.get(self.endpoint(table)))
            .query(&[("select", "*")])
            .query(query);
        let rows = Self::check(table, req.send()?)?.json::<Vec<T>>()?;
        tracing::debug!(table, rows = rows.len(), "select");
        Ok(rows)
    }

    fn select_one<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<Option<T>> {
        let rows = self.select::<T>(table, &[("id", eq(id))])?;
        Ok(rows.into_iter().next())
    }

    fn insert<B: Serialize, T: DeserializeOwned>(&self, table: &str, body: &B) -> Result<T> {
        let req = self
            .authed(self.client.post(self.endpoint(table)))
            .header("Prefer", "return=representation")
            .json(body);
        let rows = Self::check(table, req.send()?)?.json::<Vec<T>>()?;
        rows.into_iter()
            .next()
            .ok_or_else(|| TileError::Backend(format!("{table}: insert returned no row")))
    }

    /// Patch one row by id. `None` when no row matched.
    fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let req = self
            .authed(self.client.patch(self.endpoint(table)))
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation")
            .json(body);
        let rows = Self::check(table, req.send()?)?.json::<Vec<T>>()?;
        Ok(rows.into_iter().next())
    }

    fn profiles_by_id(&self, ids: &BTreeSet<&str>) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(PROFILES, &[("id", in_list(ids.iter().copied()))])
    }

    fn jobs_by_id(&self, ids: &BTreeSet<&str>) -> Result<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(JOBS, &[("id", in_list(ids.iter().copied()))])
    }

    fn resolve_one(&self, job: Job) -> Result<JobWithAssignee> {
        let ids: BTreeSet<&str> = job.assigned_to.as_deref().into_iter().collect();
        let profiles = self.profiles_by_id(&ids)?;
        Ok(JobWithAssignee::resolve(job, &profiles))
    }

    fn with_job(&self, invoice: Invoice) -> Result<InvoiceWithJob> {
        let ids = BTreeSet::from([invoice.job_id.as_str()]);
        let jobs = self.jobs_by_id(&ids)?;
        Ok(InvoiceWithJob::resolve(invoice, &jobs))
    }
}

// ---------------------------------------------------------------------------
// JobStore
// ---------------------------------------------------------------------------

impl JobStore for SupabaseStore {
    fn mode(&self) -> DataMode {
        DataMode::Live
    }

    fn list_jobs(&self) -> Result<Vec<JobWithAssignee>> {
        let jobs: Vec<Job> = self.select(
            JOBS,
            &[(
                "order",
                "scheduled_start.asc.nullslast,created_at.desc".to_string(),
            )],
        )?;
        let ids: BTreeSet<&str> = jobs.iter().filter_map(|j| j.assigned_to.as_deref()).collect();
        let profiles = self.profiles_by_id(&ids)?;
        let mut resolved: Vec<_> = jobs
            .iter()
            .map(|j| JobWithAssignee::resolve(j.clone(), &profiles))
            .collect();
        // Server order is a hint; the local sort keeps demo and live identical.
        sort_for_dashboard(&mut resolved);
        Ok(resolved)
    }

    fn get_job(&self, id: &str) -> Result<JobWithAssignee> {
        let job: Job = self
            .select_one(JOBS, id)?
            .ok_or_else(|| TileError::JobNotFound(id.to_string()))?;
        self.resolve_one(job)
    }

    fn create_job(&self, job: NewJob, created_by: &str) -> Result<JobWithAssignee> {
        let draft = job.into_job(String::new(), 0, Some(created_by.to_string()), Utc::now())?;
        let created: Job = self.insert(JOBS, &JobInsert::from(&draft))?;
        tracing::info!(id = %created.id, number = created.job_number, "job created");
        self.resolve_one(created)
    }

    fn update_job_status(&self, id: &str, status: JobStatus) -> Result<JobWithAssignee> {
        let patch = StatusPatch {
            status,
            updated_at: Utc::now(),
        };
        let job: Job = self
            .update(JOBS, id, &patch)?
            .ok_or_else(|| TileError::JobNotFound(id.to_string()))?;
        self.resolve_one(job)
    }

    fn list_team(&self) -> Result<Vec<Profile>> {
        let mut team: Vec<Profile> = self.select(
            PROFILES,
            &[
                ("is_active", eq("true")),
                ("order", "full_name.asc".to_string()),
            ],
        )?;
        team.retain(|p| p.is_active);
        team.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(team)
    }

    fn get_profile(&self, id: &str) -> Result<Profile> {
        self.select_one(PROFILES, id)?
            .ok_or_else(|| TileError::ProfileNotFound(id.to_string()))
    }

    fn list_invoices(&self) -> Result<Vec<InvoiceWithJob>> {
        let invoices: Vec<Invoice> =
            self.select(INVOICES, &[("order", "created_at.desc".to_string())])?;
        let ids: BTreeSet<&str> = invoices.iter().map(|i| i.job_id.as_str()).collect();
        let jobs = self.jobs_by_id(&ids)?;
        let mut resolved: Vec<_> = invoices
            .iter()
            .map(|i| InvoiceWithJob::resolve(i.clone(), &jobs))
            .collect();
        resolved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(resolved)
    }

    fn get_invoice(&self, id: &str) -> Result<InvoiceWithJob> {
        let invoice: Invoice = self
            .select_one(INVOICES, id)?
            .ok_or_else(|| TileError::InvoiceNotFound(id.to_string()))?;
        self.with_job(invoice)
    }

    fn invoices_for_job(&self, job_id: &str) -> Result<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self.select(
            INVOICES,
            &[
                ("job_id", eq(job_id)),
                ("order", "created_at.asc".to_string()),
            ],
        )?;
        invoices.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(invoices)
    }

    fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceWithJob> {
        let now = Utc::now();
        let year = numbering_year(now);
        let taken: Vec<Invoice> = self.select(
            INVOICES,
            &[("invoice_number", format!("like.INV-{year}-*"))],
        )?;
        let number = next_invoice_number(&taken, year);
        let draft = invoice.into_invoice(String::new(), number, now)?;
        let created: Invoice = self.insert(INVOICES, &InvoiceInsert::from(&draft))?;
        tracing::info!(id = %created.id, number = %created.invoice_number, "invoice created");
        self.with_job(created)
    }

    fn update_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<InvoiceWithJob> {
        let patch = StatusPatch {
            status,
            updated_at: Utc::now(),
        };
        let invoice: Invoice = self
            .update(INVOICES, id, &patch)?
            .ok_or_else(|| TileError::InvoiceNotFound(id.to_string()))?;
        self.with_job(invoice)
    }

    fn photos_for_job(&self, job_id: &str) -> Result<Vec<JobPhoto>> {
        self.select(
            PHOTOS,
            &[
                ("job_id", eq(job_id)),
                ("order", "created_at.asc".to_string()),
            ],
        )
    }

    /// The backend stores no job-site coordinates.
    fn job_coordinates(&self) -> Result<HashMap<String, GeoPoint>> {
        Ok(HashMap::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
