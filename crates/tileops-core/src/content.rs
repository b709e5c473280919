//! Company details shown around the dashboard, from a CMS when one is
//! configured and from built-in defaults otherwise.

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// CompanyInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub weekday: String,
    pub saturday: String,
    pub sunday: String,
    pub short_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStats {
    pub years_experience: String,
    pub bathrooms_per_year: String,
    pub google_rating: String,
    pub review_count: String,
    pub response_time: String,
}

/// Always fully populated; callers never check for missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub company_name: String,
    pub tagline: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: BusinessHours,
    pub stats: CompanyStats,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            company_name: "Aguirre Modern Tile".into(),
            tagline: "Expert Tile Installation".into(),
            description: "Professional tile installation in Greater Boston for over 15 years. \
                          Bathroom renovations, shower builds, floor tile, backsplash, and repair."
                .into(),
            phone: "(617) 766-1259".into(),
            email: "vin@moderntile.pro".into(),
            address: "106 Pemberton St, Revere, MA 02151".into(),
            hours: BusinessHours {
                weekday: "Monday-Friday: 7:00 AM - 6:00 PM".into(),
                saturday: "Saturday: 8:00 AM - 4:00 PM".into(),
                sunday: "Sunday: Closed (emergencies only)".into(),
                short_display: "Mon-Sat: 7AM - 6PM".into(),
            },
            stats: CompanyStats {
                years_experience: "15+".into(),
                bathrooms_per_year: "220+".into(),
                google_rating: "4.9".into(),
                review_count: "150+".into(),
                response_time: "5 minutes".into(),
            },
        }
    }
}

// CMS documents may omit or blank any field.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoursDoc {
    weekday: Option<String>,
    saturday: Option<String>,
    sunday: Option<String>,
    short_display: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsDoc {
    years_experience: Option<String>,
    bathrooms_per_year: Option<String>,
    google_rating: Option<String>,
    review_count: Option<String>,
    response_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyInfoDoc {
    company_name: Option<String>,
    tagline: Option<String>,
    description: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    #[serde(default)]
    hours: Option<HoursDoc>,
    #[serde(default)]
    stats: Option<StatsDoc>,
}

fn fill(target: &mut String, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        *target = v;
    }
}

impl CompanyInfo {
    /// Defaults overlaid with whatever non-blank fields `doc` carries.
    fn merged(doc: CompanyInfoDoc) -> Self {
        let mut info = CompanyInfo::default();
        fill(&mut info.company_name, doc.company_name);
        fill(&mut info.tagline, doc.tagline);
        fill(&mut info.description, doc.description);
        fill(&mut info.phone, doc.phone);
        fill(&mut info.email, doc.email);
        fill(&mut info.address, doc.address);
        let hours = doc.hours.unwrap_or_default();
        fill(&mut info.hours.weekday, hours.weekday);
        fill(&mut info.hours.saturday, hours.saturday);
        fill(&mut info.hours.sunday, hours.sunday);
        fill(&mut info.hours.short_display, hours.short_display);
        let stats = doc.stats.unwrap_or_default();
        fill(&mut info.stats.years_experience, stats.years_experience);
        fill(&mut info.stats.bathrooms_per_year, stats.bathrooms_per_year);
        fill(&mut info.stats.google_rating, stats.google_rating);
        fill(&mut info.stats.review_count, stats.review_count);
        fill(&mut info.stats.response_time, stats.response_time);
        info
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

pub trait ContentProvider: Send + Sync {
    fn company_info(&self) -> CompanyInfo;
}

/// Built-in defaults only.
#[derive(Debug, Clone, Default)]
pub struct StaticContent;

impl ContentProvider for StaticContent {
    fn company_info(&self) -> CompanyInfo {
        CompanyInfo::default()
    }
}

/// Reads globals from a Payload-style CMS at `{base}/api/globals/{slug}`.
pub struct CmsContent {
    base_url: String,
    client: reqwest::blocking::Client,
}

pub const COMPANY_INFO_SLUG: &str = "company-info";

impl CmsContent {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn fetch_global(&self, slug: &str) -> crate::Result<CompanyInfoDoc> {
        let url = format!("{}/api/globals/{slug}", self.base_url);
        let doc = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json::<CompanyInfoDoc>()?;
        Ok(doc)
    }
}

impl ContentProvider for CmsContent {
    fn company_info(&self) -> CompanyInfo {
        match self.fetch_global(COMPANY_INFO_SLUG) {
            Ok(doc) => CompanyInfo::merged(doc),
            Err(e) => {
                tracing::warn!(error = %e, base = %self.base_url, "cms unavailable, using default company info");
                CompanyInfo::default()
            }
        }
    }
}

/// The provider for `config`: the CMS when a URL is configured, otherwise the
/// built-in defaults.
pub fn open(config: &Config) -> Arc<dyn ContentProvider> {
    let Some(url) = config.cms_url() else {
        return Arc::new(StaticContent);
    };
    match CmsContent::new(url, Duration::from_secs(config.content.timeout_secs)) {
        Ok(cms) => Arc::new(cms),
        Err(e) => {
            tracing::warn!(error = %e, "could not build cms client, using default company info");
            Arc::new(StaticContent)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
