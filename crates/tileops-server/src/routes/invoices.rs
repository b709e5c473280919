use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tileops_core::dashboard::{InvoiceList, InvoiceRow};
use tileops_core::invoice::{InvoiceFilter, NewInvoice};

use crate::auth::Actor;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceParams {
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /api/invoices?status=: newest first, filtered on effective status.
pub async fn list_invoices(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<InvoiceParams>,
) -> Result<Json<InvoiceList>, AppError> {
    let filter: InvoiceFilter = params.status.as_deref().unwrap_or("all").parse()?;
    let today = app.today();
    let dashboard = app.dashboard.clone();
    let list = tokio::task::spawn_blocking(move || dashboard.invoices(&actor, filter, today))
        .await
        .map_err(AppError::join)??;
    Ok(Json(list))
}

/// GET /api/invoices/{id}
pub async fn get_invoice(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<InvoiceRow>, AppError> {
    let today = app.today();
    let dashboard = app.dashboard.clone();
    let row = tokio::task::spawn_blocking(move || dashboard.invoice(&actor, &id, today))
        .await
        .map_err(AppError::join)??;
    Ok(Json(row))
}

/// POST /api/invoices: create a draft with the next invoice number.
pub async fn create_invoice(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Json(body): Json<NewInvoice>,
) -> Result<(StatusCode, Json<InvoiceRow>), AppError> {
    let today = app.today();
    let dashboard = app.dashboard.clone();
    let row = tokio::task::spawn_blocking(move || dashboard.create_invoice(&actor, body, today))
        .await
        .map_err(AppError::join)??;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/invoices/{id}/send: draft to sent.
pub async fn send_invoice(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<InvoiceRow>, AppError> {
    let now = app.now();
    let dashboard = app.dashboard.clone();
    let row = tokio::task::spawn_blocking(move || dashboard.send_invoice(&actor, &id, now))
        .await
        .map_err(AppError::join)??;
    Ok(Json(row))
}

/// POST /api/invoices/{id}/pay: sent or overdue to paid.
pub async fn pay_invoice(
    State(app): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<InvoiceRow>, AppError> {
    let now = app.now();
    let dashboard = app.dashboard.clone();
    let row = tokio::task::spawn_blocking(move || dashboard.pay_invoice(&actor, &id, now))
        .await
        .map_err(AppError::join)??;
    Ok(Json(row))
}
