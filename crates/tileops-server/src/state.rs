use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Arc;
use tileops_core::content::{ContentProvider, StaticContent};
use tileops_core::dashboard::Dashboard;
use tileops_core::store::{DemoStore, JobStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub content: Arc<dyn ContentProvider>,
    /// Pins "today" for reproducible responses; the local date otherwise.
    pub fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, content: Arc<dyn ContentProvider>) -> Self {
        Self {
            dashboard: Arc::new(Dashboard::new(store)),
            content,
            fixed_today: None,
        }
    }

    /// Demo data with the built-in company info.
    pub fn demo() -> tileops_core::Result<Self> {
        Ok(Self::new(
            Arc::new(DemoStore::new()?),
            Arc::new(StaticContent),
        ))
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
