//! In-memory store seeded from the bundled sample data. Writes live until
//! the process exits.

use super::{DataMode, JobStore};
use crate::error::{Result, TileError};
use crate::invoice::{
    next_invoice_number, numbering_year, Invoice, InvoiceStatus, InvoiceWithJob, NewInvoice,
};
use crate::model::{sort_for_dashboard, GeoPoint, Job, JobPhoto, JobWithAssignee, Profile};
use crate::status::JobStatus;
use crate::validation::NewJob;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// The sample business: an owner, one crew lead, six jobs across the
/// lifecycle and five invoices.
pub const DEMO_JSON: &str = include_str!("../../fixtures/demo.json");

/// The profile demo-mode requests act as when nobody is named.
pub const DEMO_OWNER_ID: &str = "demo-owner-id";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoData {
    pub profiles: Vec<Profile>,
    pub jobs: Vec<Job>,
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub job_photos: Vec<JobPhoto>,
    #[serde(default)]
    pub job_coordinates: HashMap<String, GeoPoint>,
}

impl DemoData {
    pub fn bundled() -> Result<Self> {
        Ok(serde_json::from_str(DEMO_JSON)?)
    }

    fn resolve(&self, job: &Job) -> JobWithAssignee {
        JobWithAssignee::resolve(job.clone(), &self.profiles)
    }

    fn with_job(&self, invoice: &Invoice) -> InvoiceWithJob {
        InvoiceWithJob::resolve(invoice.clone(), &self.jobs)
    }
}

pub struct DemoStore {
    data: RwLock<DemoData>,
}

impl DemoStore {
    pub fn new() -> Result<Self> {
        Ok(Self::from_data(DemoData::bundled()?))
    }

    pub fn from_data(data: DemoData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DemoData>> {
        self.data
            .read()
            .map_err(|_| TileError::Backend("demo data lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DemoData>> {
        self.data
            .write()
            .map_err(|_| TileError::Backend("demo data lock poisoned".to_string()))
    }
}

impl JobStore for DemoStore {
    fn mode(&self) -> DataMode {
        DataMode::Demo
    }

    fn list_jobs(&self) -> Result<Vec<JobWithAssignee>> {
        let data = self.read()?;
        let mut jobs: Vec<_> = data.jobs.iter().map(|j| data.resolve(j)).collect();
        sort_for_dashboard(&mut jobs);
        Ok(jobs)
    }

    fn get_job(&self, id: &str) -> Result<JobWithAssignee> {
        let data = self.read()?;
        data.jobs
            .iter()
            .find(|j| j.id == id)
            .map(|j| data.resolve(j))
            .ok_or_else(|| TileError::JobNotFound(id.to_string()))
    }

    fn create_job(&self, job: NewJob, created_by: &str) -> Result<JobWithAssignee> {
        let mut data = self.write()?;
        let number = data.jobs.iter().map(|j| j.job_number).max().unwrap_or(0) + 1;
        let job = job.into_job(
            Uuid::new_v4().to_string(),
            number,
            Some(created_by.to_string()),
            Utc::now(),
        )?;
        tracing::debug!(id = %job.id, number, "demo job created");
        let resolved = data.resolve(&job);
        data.jobs.push(job);
        Ok(resolved)
    }

    fn update_job_status(&self, id: &str, status: JobStatus) -> Result<JobWithAssignee> {
        let mut data = self.write()?;
        let job = data
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| TileError::JobNotFound(id.to_string()))?;
        job.status = status;
        job.updated_at = Utc::now();
        let job = job.clone();
        Ok(data.resolve(&job))
    }

    fn list_team(&self) -> Result<Vec<Profile>> {
        let data = self.read()?;
        let mut team: Vec<_> = data.profiles.iter().filter(|p| p.is_active).cloned().collect();
        team.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(team)
    }

    fn get_profile(&self, id: &str) -> Result<Profile> {
        self.read()?
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| TileError::ProfileNotFound(id.to_string()))
    }

    fn list_invoices(&self) -> Result<Vec<InvoiceWithJob>> {
        let data = self.read()?;
        let mut invoices: Vec<_> = data.invoices.iter().map(|i| data.with_job(i)).collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }

    fn get_invoice(&self, id: &str) -> Result<InvoiceWithJob> {
        let data = self.read()?;
        data.invoices
            .iter()
            .find(|i| i.id == id)
            .map(|i| data.with_job(i))
            .ok_or_else(|| TileError::InvoiceNotFound(id.to_string()))
    }

    fn invoices_for_job(&self, job_id: &str) -> Result<Vec<Invoice>> {
        let data = self.read()?;
        let mut invoices: Vec<_> = data
            .invoices
            .iter()
            .filter(|i| i.job_id == job_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(invoices)
    }

    fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceWithJob> {
        let mut data = self.write()?;
        let now = Utc::now();
        let number = next_invoice_number(&data.invoices, numbering_year(now));
        let invoice = invoice.into_invoice(Uuid::new_v4().to_string(), number, now)?;
        tracing::debug!(id = %invoice.id, number = %invoice.invoice_number, "demo invoice created");
        let resolved = data.with_job(&invoice);
        data.invoices.push(invoice);
        Ok(resolved)
    }

    fn update_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<InvoiceWithJob> {
        let mut data = self.write()?;
        let invoice = data
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| TileError::InvoiceNotFound(id.to_string()))?;
        invoice.status = status;
        invoice.updated_at = Utc::now();
        let invoice = invoice.clone();
        Ok(data.with_job(&invoice))
    }

    fn photos_for_job(&self, job_id: &str) -> Result<Vec<JobPhoto>> {
        let mut photos: Vec<_> = self
            .read()?
            .job_photos
            .iter()
            .filter(|p| p.job_id == job_id)
            .cloned()
            .collect();
        photos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(photos)
    }

    fn job_coordinates(&self) -> Result<HashMap<String, GeoPoint>> {
        Ok(self.read()?.job_coordinates.clone())
    }
}
