use axum::http::StatusCode;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tileops_server::{build_router, AppState};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const LEAD: &str = "demo-lead-id";

fn app() -> axum::Router {
    let today = NaiveDate::from_ymd_opt(2025, 2, 12).unwrap();
    build_router(AppState::demo().unwrap().with_today(today))
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    actor: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(id) = actor {
        req = req.header("x-profile-id", id);
    }
    let req = match body {
        Some(json) => req
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => req.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a GET request as the default actor.
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None, None).await
}

async fn get_as(app: axum::Router, uri: &str, actor: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, Some(actor), None).await
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    actor: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, actor, Some(body)).await
}

// ---------------------------------------------------------------------------
// Mode and dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mode_reports_demo() {
    let (status, body) = get(app(), "/api/mode").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "demo");
    assert_eq!(body["demo"], true);
}

#[tokio::test]
async fn dashboard_defaults_to_list() {
    let (status, body) = get(app(), "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["kind"], "list");
    assert_eq!(body["metrics"]["total_jobs"], 6);
    assert_eq!(body["actor"]["id"], "demo-owner-id");
    assert_eq!(body["view"]["rows"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn unknown_view_falls_back_to_list() {
    let (status, body) = get(app(), "/api/dashboard?view=gantt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["kind"], "list");
}

#[tokio::test]
async fn mine_filter_for_lead() {
    let (status, body) = get_as(app(), "/api/dashboard?view=list&mine=true", LEAD).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["view"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["assigned_to"] == LEAD));
}

#[tokio::test]
async fn bad_month_is_400() {
    let (status, body) = get(app(), "/api/views/calendar?month=2025-13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("2025-13"));
}

#[tokio::test]
async fn unknown_actor_is_401() {
    let (status, _) = get_as(app(), "/api/dashboard", "nobody").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn kanban_has_six_columns_without_cancelled() {
    let (status, body) = get(app(), "/api/views/kanban").await;
    assert_eq!(status, StatusCode::OK);
    let columns = body["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 6);
    assert!(columns.iter().all(|c| c["status"] != "cancelled"));
}

#[tokio::test]
async fn calendar_for_february() {
    let (status, body) = get(app(), "/api/views/calendar?month=2025-02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "calendar");
    assert_eq!(body["month"], "2025-02");
    assert_eq!(body["prev"], "2025-01");
}

#[tokio::test]
async fn timeline_window_is_padded() {
    let (status, body) = get(app(), "/api/views/timeline?month=2025-02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start"], "2025-01-25");
    assert_eq!(body["end"], "2025-03-07");
    assert_eq!(body["total_days"], 42);
}

#[tokio::test]
async fn lead_drag_on_foreign_job_is_rejected() {
    let app = app();
    let (status, body) = post_json(
        app.clone(),
        "/api/views/kanban/moves",
        Some(LEAD),
        serde_json::json!({"job_id": "demo-job-2", "new_status": "in_progress"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "rejected");

    let (_, job) = get(app, "/api/jobs/demo-job-2").await;
    assert_eq!(job["job"]["status"], "scheduled");
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_detail_and_missing_job() {
    let app = app();
    let (status, body) = get(app.clone(), "/api/jobs/demo-job-5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["financials"]["variance_label"], "$400 under budget");
    assert_eq!(body["job"]["assignee"]["full_name"], "Carlos Rivera");

    let (status, body) = get(app, "/api/jobs/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn lead_status_rules_over_http() {
    let app = app();
    let (status, _) = post_json(
        app.clone(),
        "/api/jobs/demo-job-2/status",
        Some(LEAD),
        serde_json::json!({"status": "in_progress"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        app.clone(),
        "/api/jobs/demo-job-1/status",
        Some(LEAD),
        serde_json::json!({"status": "paid"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = post_json(
        app,
        "/api/jobs/demo-job-1/status",
        Some(LEAD),
        serde_json::json!({"status": "completed"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn unknown_status_name_is_400() {
    let (status, _) = post_json(
        app(),
        "/api/jobs/demo-job-1/status",
        None,
        serde_json::json!({"status": "done"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_job_validates_fields() {
    let (status, body) = post_json(
        app(),
        "/api/jobs",
        None,
        serde_json::json!({"title": "", "client_name": "A", "client_email": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"client_name"));
    assert!(fields.contains(&"client_email"));
}

#[tokio::test]
async fn create_job_as_owner_then_list() {
    let app = app();
    let (status, body) = post_json(
        app.clone(),
        "/api/jobs",
        None,
        serde_json::json!({
            "title": "Mudroom Floor",
            "client_name": "Ana Silva",
            "client_phone": "(617) 555-1234",
            "scheduled_start": "2025-03-10",
            "scheduled_end": "2025-03-11",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "lead");
    assert_eq!(body["job_number"], 7);

    let (_, jobs) = get(app, "/api/jobs").await;
    assert_eq!(jobs.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn lead_cannot_create_jobs() {
    let (status, _) = post_json(
        app(),
        "/api/jobs",
        Some(LEAD),
        serde_json::json!({"title": "Patio", "client_name": "Ana Silva"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Analytics, team, content
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analytics_pipeline_value() {
    let (status, body) = get(app(), "/api/analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pipeline_value"], 17300.0);
    assert_eq!(body["by_status"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn team_and_map() {
    let app = app();
    let (status, team) = get(app.clone(), "/api/team").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team[0]["full_name"], "Carlos Rivera");

    let (status, map) = get(app, "/api/team-map").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(map["center"]["lat"], 42.36);
    assert_eq!(map["jobs"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn company_info_defaults() {
    let (status, body) = get(app(), "/api/content/company").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["companyName"], "Aguirre Modern Tile");
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invoice_list_and_filter() {
    let app = app();
    let (status, body) = get(app.clone(), "/api/invoices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["invoices"][0]["invoice_number"], "INV-2025-002");

    let (status, body) = get(app.clone(), "/api/invoices?status=paid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoices"].as_array().unwrap().len(), 3);

    let (status, _) = get(app, "/api/invoices?status=void").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invoices_are_owner_only() {
    let (status, _) = get_as(app(), "/api/invoices", LEAD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invoice_create_send_pay() {
    let app = app();
    let (status, created) = post_json(
        app.clone(),
        "/api/invoices",
        None,
        serde_json::json!({
            "job_id": "demo-job-2",
            "due_date": "2025-03-15",
            "line_items": [
                {"description": "Subway tile", "quantity": 1, "unit_price": 1200},
                {"description": "Labor", "quantity": 2, "unit_price": 800}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "draft");
    assert_eq!(created["amount"], 2800.0);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = post_json(app.clone(), &format!("/api/invoices/{id}/pay"), None, serde_json::json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, sent) = post_json(app.clone(), &format!("/api/invoices/{id}/send"), None, serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["status"], "sent");

    let (status, paid) = post_json(app, &format!("/api/invoices/{id}/pay"), None, serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["effective_status"], "paid");
}

#[tokio::test]
async fn empty_invoice_is_400() {
    let (status, body) = post_json(
        app(),
        "/api/invoices",
        None,
        serde_json::json!({"job_id": "demo-job-2", "due_date": "2025-03-15", "line_items": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"].is_array());
}

#[tokio::test]
async fn invoice_for_unknown_job_is_created_without_job() {
    let (status, created) = post_json(
        app(),
        "/api/invoices",
        None,
        serde_json::json!({
            "job_id": "ghost",
            "due_date": "2025-03-15",
            "line_items": [{"description": "Consult", "quantity": 1, "unit_price": 150}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["job"].is_null());
    assert_eq!(created["job_id"], "ghost");
    assert_eq!(created["amount"], 150.0);
}

#[tokio::test]
async fn missing_invoice_is_404() {
    let (status, _) = get(app(), "/api/invoices/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
