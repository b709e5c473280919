pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and by the integration tests.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/mode", get(routes::dashboard::get_mode))
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        // Jobs
        .route(
            "/api/jobs",
            get(routes::jobs::list_jobs).post(routes::jobs::create_job),
        )
        .route("/api/jobs/{id}", get(routes::jobs::get_job))
        .route("/api/jobs/{id}/status", post(routes::jobs::update_status))
        // Views
        .route("/api/views/kanban", get(routes::views::get_kanban))
        .route("/api/views/kanban/moves", post(routes::views::move_card))
        .route("/api/views/calendar", get(routes::views::get_calendar))
        .route("/api/views/timeline", get(routes::views::get_timeline))
        // Analytics and team
        .route("/api/analytics", get(routes::analytics::get_analytics))
        .route("/api/team", get(routes::team::list_team))
        .route("/api/team-map", get(routes::team::get_team_map))
        // Invoices
        .route(
            "/api/invoices",
            get(routes::invoices::list_invoices).post(routes::invoices::create_invoice),
        )
        .route("/api/invoices/{id}", get(routes::invoices::get_invoice))
        .route(
            "/api/invoices/{id}/send",
            post(routes::invoices::send_invoice),
        )
        .route("/api/invoices/{id}/pay", post(routes::invoices::pay_invoice))
        // Content
        .route("/api/content/company", get(routes::content::get_company))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Serve the dashboard API on a bound listener until the server stops.
///
/// The caller binds, so it can report the actual port first.
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let mode = app_state.dashboard.mode();
    let app = build_router(app_state);

    tracing::info!(%mode, "tileops API listening on http://{addr}");

    if open_browser {
        let url = format!("http://{addr}/api/dashboard");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
