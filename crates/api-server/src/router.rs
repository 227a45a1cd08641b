//! API router — mounts the wizard, CRM lookup, campaign, and
//! operational endpoints.

use crate::handlers::{self, AppState};
use axum::routing::{get, patch, post};
use axum::Router;

/// Build the API router with all endpoints.
/// Returns a Router ready for middleware layers.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Wizard sessions
        .route("/api/v1/wizard", post(handlers::create_session))
        .route("/api/v1/wizard/{id}", get(handlers::get_session).delete(handlers::abandon_session))
        .route("/api/v1/wizard/{id}/draft", patch(handlers::update_draft))
        .route("/api/v1/wizard/{id}/next", post(handlers::next_step))
        .route("/api/v1/wizard/{id}/back", post(handlers::back_step))
        .route("/api/v1/wizard/{id}/jump", post(handlers::jump_step))
        .route("/api/v1/wizard/{id}/import", post(handlers::upload_sheet))
        .route("/api/v1/wizard/{id}/import/finalize", post(handlers::finalize_import))
        .route("/api/v1/wizard/{id}/submit", post(handlers::submit_session))
        // CRM lookups
        .route("/api/v1/leads", get(handlers::list_leads))
        .route("/api/v1/connections", get(handlers::list_connections))
        .route("/api/v1/templates", get(handlers::list_templates))
        // Campaigns
        .route("/api/v1/campaigns", get(handlers::list_campaigns))
        .route("/api/v1/campaigns/{id}", get(handlers::get_campaign))
        .route("/api/v1/campaigns/{id}/recipients", get(handlers::campaign_recipients))
        // Audit log
        .route("/api/v1/audit-log", get(handlers::audit_log))
        // Operational endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness))
        .route("/live", get(handlers::liveness))
        .with_state(state)
}
