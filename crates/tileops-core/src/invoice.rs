use crate::error::{FieldError, Result, TileError};
use crate::model::Job;
use crate::money::{from_cents, round_cents, to_cents};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// InvoiceStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    /// Never written by this crate: derived from `sent` + a past due date.
    /// Accepted on read in case a backend stores it.
    Overdue,
}

impl InvoiceStatus {
    pub fn all() -> &'static [InvoiceStatus] {
        &[
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "bg-gray-100 text-gray-800",
            InvoiceStatus::Sent => "bg-blue-100 text-blue-800",
            InvoiceStatus::Paid => "bg-green-100 text-green-800",
            InvoiceStatus::Overdue => "bg-red-100 text-red-800",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(TileError::InvalidInvoiceStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// LineItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            amount: round_cents(quantity * unit_price),
        }
    }
}

// ---------------------------------------------------------------------------
// Invoice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub job_id: String,
    pub invoice_number: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub stripe_invoice_id: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// The status to show: a sent invoice past its due date reads as overdue.
    pub fn effective_status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.status == InvoiceStatus::Sent && self.due_date < today {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }

    /// Sum of line amounts, in cents-exact dollars.
    pub fn line_total(&self) -> f64 {
        from_cents(self.line_items.iter().map(|l| to_cents(l.amount)).sum())
    }

    pub fn mark_sent(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.move_to(InvoiceStatus::Sent, now)
    }

    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.move_to(InvoiceStatus::Paid, now)
    }

    /// Apply a stored-status change. Only `draft → sent` and
    /// `sent|overdue → paid` exist.
    pub fn move_to(&mut self, target: InvoiceStatus, now: DateTime<Utc>) -> Result<()> {
        let allowed = matches!(
            (self.status, target),
            (InvoiceStatus::Draft, InvoiceStatus::Sent)
                | (InvoiceStatus::Sent, InvoiceStatus::Paid)
                | (InvoiceStatus::Overdue, InvoiceStatus::Paid)
        );
        if !allowed {
            return Err(TileError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
                reason: "invoices move draft → sent → paid".to_string(),
            });
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

/// An invoice with its job resolved; `job` is `None` when the id matches
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceWithJob {
    #[serde(flatten)]
    pub invoice: Invoice,
    #[serde(default)]
    pub job: Option<Job>,
}

impl InvoiceWithJob {
    pub fn resolve<'a>(invoice: Invoice, jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        let job = jobs.into_iter().find(|j| j.id == invoice.job_id).cloned();
        Self { invoice, job }
    }
}

impl std::ops::Deref for InvoiceWithJob {
    type Target = Invoice;

    fn deref(&self) -> &Invoice {
        &self.invoice
    }
}

// ---------------------------------------------------------------------------
// InvoiceFilter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvoiceFilter {
    #[default]
    All,
    Status(InvoiceStatus),
}

impl InvoiceFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceFilter::All => "all",
            InvoiceFilter::Status(s) => s.as_str(),
        }
    }

    /// Matches on the effective status, so the overdue tab lists sent
    /// invoices whose due date has passed.
    pub fn matches(self, invoice: &Invoice, today: NaiveDate) -> bool {
        match self {
            InvoiceFilter::All => true,
            InvoiceFilter::Status(s) => invoice.effective_status(today) == s,
        }
    }
}

impl fmt::Display for InvoiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InvoiceFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceFilter {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "all" => Ok(InvoiceFilter::All),
            other => other.parse().map(InvoiceFilter::Status),
        }
    }
}

// ---------------------------------------------------------------------------
// NewInvoice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewInvoice {
    pub job_id: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
    #[serde(default)]
    pub discount: Option<f64>,
}

impl NewInvoice {
    pub fn lines(&self) -> Vec<LineItem> {
        self.line_items
            .iter()
            .map(|l| LineItem::new(l.description.trim(), l.quantity, l.unit_price))
            .collect()
    }

    /// Σ line amounts − discount, computed in cents.
    pub fn total(&self) -> f64 {
        let lines: i64 = self.lines().iter().map(|l| to_cents(l.amount)).sum();
        from_cents(lines - to_cents(self.discount.unwrap_or(0.0)))
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.job_id.trim().is_empty() {
            errors.push(FieldError::new("job_id", "Select a job"));
        }
        if self.due_date.is_none() {
            errors.push(FieldError::new("due_date", "Due date is required"));
        }
        if self.line_items.is_empty() {
            errors.push(FieldError::new("line_items", "Add at least one line item"));
        }
        for (i, line) in self.line_items.iter().enumerate() {
            if line.description.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("line_items[{i}].description"),
                    "Description is required",
                ));
            }
            if !(line.quantity > 0.0) {
                errors.push(FieldError::new(
                    format!("line_items[{i}].quantity"),
                    "Quantity must be at least 1",
                ));
            }
            if !(line.unit_price >= 0.0) {
                errors.push(FieldError::new(
                    format!("line_items[{i}].unit_price"),
                    "Unit price cannot be negative",
                ));
            }
        }
        if !self.line_items.is_empty() && !self.lines().iter().any(|l| l.amount > 0.0) {
            errors.push(FieldError::new(
                "line_items",
                "At least one line item must have a positive amount",
            ));
        }
        if self.discount.is_some_and(|d| !(d >= 0.0)) {
            errors.push(FieldError::new("discount", "Discount cannot be negative"));
        }
        if self.total() <= 0.0 {
            errors.push(FieldError::new("amount", "Invoice total must be greater than $0"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TileError::Validation(errors))
        }
    }

    /// Validate and build a draft invoice.
    pub fn into_invoice(
        self,
        id: impl Into<String>,
        invoice_number: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        self.validate()?;
        let amount = self.total();
        let line_items = self.lines();
        let due_date = self
            .due_date
            .ok_or_else(|| TileError::validation("due_date", "Due date is required"))?;
        Ok(Invoice {
            id: id.into(),
            job_id: self.job_id.trim().to_string(),
            invoice_number: invoice_number.into(),
            amount,
            status: InvoiceStatus::Draft,
            due_date,
            stripe_invoice_id: None,
            line_items,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Next number in the `INV-YYYY-NNN` series for `year`.
pub fn next_invoice_number<'a>(
    existing: impl IntoIterator<Item = &'a Invoice>,
    year: i32,
) -> String {
    let prefix = format!("INV-{year}-");
    let last = existing
        .into_iter()
        .filter_map(|inv| inv.invoice_number.strip_prefix(&prefix))
        .filter_map(|seq| seq.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:03}", last.saturating_add(1))
}

/// The year an invoice created at `now` is numbered under.
pub fn numbering_year(now: DateTime<Utc>) -> i32 {
    now.year()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{date, job, ts};
    use crate::status::JobStatus;

    fn draft() -> NewInvoice {
        NewInvoice {
            job_id: "job-1".into(),
            due_date: Some(date("2025-03-01")),
            line_items: vec![
                LineItemInput {
                    description: "Porcelain tile".into(),
                    quantity: 1.0,
                    unit_price: 1400.0,
                },
                LineItemInput {
                    description: "Labor".into(),
                    quantity: 3.0,
                    unit_price: 666.67,
                },
            ],
            discount: None,
        }
    }

    #[test]
    fn fresh_invoice_amount_equals_line_sum() {
        let inv = draft().into_invoice("inv-1", "INV-2025-001", ts(2025, 2, 1)).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Draft);
        assert_eq!(inv.line_items[1].amount, 2000.01);
        assert_eq!(inv.amount, 3400.01);
        assert_eq!(to_cents(inv.amount), to_cents(inv.line_total()));
    }

    #[test]
    fn many_small_lines_do_not_drift() {
        let mut input = draft();
        input.line_items = (0..10)
            .map(|i| LineItemInput {
                description: format!("Grout bag {i}"),
                quantity: 3.0,
                unit_price: 0.1,
            })
            .collect();
        let inv = input.into_invoice("inv-2", "INV-2025-002", ts(2025, 2, 1)).unwrap();
        assert_eq!(inv.amount, 3.0);
        assert_eq!(inv.amount, inv.line_total());
    }

    #[test]
    fn discount_reduces_total() {
        let mut input = draft();
        input.discount = Some(400.01);
        assert_eq!(input.total(), 3000.0);
    }

    #[test]
    fn zero_total_is_a_validation_failure() {
        let mut input = draft();
        for line in &mut input.line_items {
            line.unit_price = 0.0;
        }
        let err = input.validate().unwrap_err();
        match err {
            TileError::Validation(fields) => {
                assert!(fields.iter().any(|f| f.field == "amount"));
                assert!(fields.iter().any(|f| f.field == "line_items"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_due_date_and_lines_are_reported_together() {
        let input = NewInvoice {
            job_id: "job-1".into(),
            ..Default::default()
        };
        let TileError::Validation(fields) = input.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert!(names.contains(&"due_date"));
        assert!(names.contains(&"line_items"));
        assert!(names.contains(&"amount"));
    }

    #[test]
    fn overdue_is_derived_not_stored() {
        let mut inv = draft().into_invoice("inv-1", "INV-2025-001", ts(2025, 2, 1)).unwrap();
        inv.mark_sent(ts(2025, 2, 2)).unwrap();
        assert_eq!(inv.effective_status(date("2025-03-01")), InvoiceStatus::Sent);
        assert_eq!(inv.effective_status(date("2025-03-02")), InvoiceStatus::Overdue);
        assert_eq!(inv.status, InvoiceStatus::Sent);

        inv.mark_paid(ts(2025, 3, 5)).unwrap();
        assert_eq!(inv.effective_status(date("2025-04-01")), InvoiceStatus::Paid);
    }

    #[test]
    fn invoice_edges_are_forward_only() {
        let mut inv = draft().into_invoice("inv-1", "INV-2025-001", ts(2025, 2, 1)).unwrap();
        assert!(inv.mark_paid(ts(2025, 2, 2)).is_err());
        inv.mark_sent(ts(2025, 2, 2)).unwrap();
        assert!(inv.mark_sent(ts(2025, 2, 3)).is_err());
        inv.mark_paid(ts(2025, 2, 4)).unwrap();
        assert!(inv.move_to(InvoiceStatus::Draft, ts(2025, 2, 5)).is_err());
    }

    #[test]
    fn filter_uses_effective_status() {
        let mut inv = draft().into_invoice("inv-1", "INV-2025-001", ts(2025, 2, 1)).unwrap();
        inv.mark_sent(ts(2025, 2, 2)).unwrap();
        let today = date("2025-04-01");
        let overdue: InvoiceFilter = "overdue".parse().unwrap();
        let sent: InvoiceFilter = "sent".parse().unwrap();
        assert!(overdue.matches(&inv, today));
        assert!(!sent.matches(&inv, today));
        assert!(InvoiceFilter::All.matches(&inv, today));
        assert!("bogus".parse::<InvoiceFilter>().is_err());
    }

    #[test]
    fn unknown_job_resolves_to_none() {
        let inv = draft().into_invoice("inv-1", "INV-2025-001", ts(2025, 2, 1)).unwrap();
        let jobs = vec![job("other", JobStatus::Lead, None)];
        let resolved = InvoiceWithJob::resolve(inv, &jobs);
        assert!(resolved.job.is_none());
    }

    #[test]
    fn numbering_continues_the_year_series() {
        let mut a = draft().into_invoice("a", "INV-2025-004", ts(2025, 2, 1)).unwrap();
        let b = draft().into_invoice("b", "INV-2024-019", ts(2025, 2, 1)).unwrap();
        assert_eq!(next_invoice_number([&a, &b], 2025), "INV-2025-005");
        assert_eq!(next_invoice_number([&a, &b], 2026), "INV-2026-001");
        a.invoice_number = "custom".into();
        assert_eq!(next_invoice_number([&a], 2025), "INV-2025-001");
    }

    #[test]
    fn numbering_survives_huge_sequences() {
        let mut a = draft().into_invoice("a", "INV-2025-4294967295", ts(2025, 2, 1)).unwrap();
        assert_eq!(next_invoice_number([&a], 2025), "INV-2025-4294967296");
        a.invoice_number = format!("INV-2025-{}", u64::MAX);
        assert_eq!(
            next_invoice_number([&a], 2025),
            format!("INV-2025-{}", u64::MAX)
        );
    }
}
