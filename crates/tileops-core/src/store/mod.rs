//! Data access. Everything above this module talks to a [`JobStore`] and
//! never learns whether the rows came from the demo fixture or a backend.

pub mod demo;
pub mod supabase;

pub use crate::config::DataMode;
pub use demo::{DemoStore, DEMO_OWNER_ID};
pub use supabase::SupabaseStore;

use crate::config::Config;
use crate::error::Result;
use crate::invoice::{Invoice, InvoiceStatus, InvoiceWithJob, NewInvoice};
use crate::model::{GeoPoint, JobPhoto, JobWithAssignee, Profile};
use crate::status::JobStatus;
use crate::validation::NewJob;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// The data-access strategy. Calls block; async callers should run them on a
/// blocking thread.
///
/// Job lists come back in dashboard order (scheduled start ascending with
/// unscheduled last, then newest first) with assignees resolved. The invoice
/// list comes back newest first; a single job's invoices and photos come back
/// oldest first.
pub trait JobStore: Send + Sync {
    fn mode(&self) -> DataMode;

    fn list_jobs(&self) -> Result<Vec<JobWithAssignee>>;
    fn get_job(&self, id: &str) -> Result<JobWithAssignee>;
    /// Insert an already validated job as a new lead.
    fn create_job(&self, job: NewJob, created_by: &str) -> Result<JobWithAssignee>;
    fn update_job_status(&self, id: &str, status: JobStatus) -> Result<JobWithAssignee>;

    /// Active profiles ordered by name.
    fn list_team(&self) -> Result<Vec<Profile>>;
    fn get_profile(&self, id: &str) -> Result<Profile>;

    fn list_invoices(&self) -> Result<Vec<InvoiceWithJob>>;
    fn get_invoice(&self, id: &str) -> Result<InvoiceWithJob>;
    fn invoices_for_job(&self, job_id: &str) -> Result<Vec<Invoice>>;
    /// Insert an already validated invoice as a draft with the next number.
    fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceWithJob>;
    fn update_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<InvoiceWithJob>;

    fn photos_for_job(&self, job_id: &str) -> Result<Vec<JobPhoto>>;
    /// Known job-site locations keyed by job id.
    fn job_coordinates(&self) -> Result<HashMap<String, GeoPoint>>;
}

/// Pick the store for `config`: the backend when both URL and key are set,
/// the demo fixture otherwise.
pub fn open(config: &Config) -> Result<Arc<dyn JobStore>> {
    match (config.mode(), &config.backend.url, &config.backend.key) {
        (DataMode::Live, Some(url), Some(key)) => {
            tracing::info!(url = %url, "using live backend");
            let timeout = Duration::from_secs(config.backend.timeout_secs);
            Ok(Arc::new(SupabaseStore::new(url, key, timeout)?))
        }
        _ => {
            tracing::info!("no backend configured, using demo data");
            Ok(Arc::new(DemoStore::new()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_picks_demo_without_backend() {
        let store = open(&Config::default()).unwrap();
        assert_eq!(store.mode(), DataMode::Demo);
    }

    #[test]
    fn open_picks_demo_when_key_missing() {
        let mut cfg = Config::default();
        cfg.backend.url = Some("https://abc.supabase.co".into());
        assert_eq!(open(&cfg).unwrap().mode(), DataMode::Demo);
    }

    #[test]
    fn open_picks_live_with_url_and_key() {
        let mut cfg = Config::default();
        cfg.backend.url = Some("https://abc.supabase.co".into());
        cfg.backend.key = Some("anon".into());
        assert_eq!(open(&cfg).unwrap().mode(), DataMode::Live);
    }
}
