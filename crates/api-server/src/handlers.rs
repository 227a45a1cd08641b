//! Axum REST handlers for the campaign wizard, CRM lookups, and
//! campaign read endpoints.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use propreach_audience::{finalize, parse_sheet, ColumnMapping};
use propreach_core::types::{
    AudienceMethod, AuditEntry, CampaignKind, CampaignRecipient, CampaignRecord, Channel,
    ChannelConnection, ErrorResponse, Lead, MessageTemplate,
};
use propreach_core::ReachError;
use propreach_crm::seed::demo_tenant_id;
use propreach_crm::{ConnectionDirectory, LeadStore, TemplateCatalog};
use propreach_launch::{AuditStore, CampaignStore, LaunchPipeline, LaunchReport, RecipientStore};
use propreach_wizard::WizardStep;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use uuid::Uuid;

use crate::session::{SessionStore, SessionView};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub leads: Arc<dyn LeadStore>,
    pub connections: Arc<ConnectionDirectory>,
    pub templates: Arc<TemplateCatalog>,
    pub campaigns: Arc<dyn CampaignStore>,
    pub recipients: Arc<dyn RecipientStore>,
    pub audit: Arc<dyn AuditStore>,
    pub pipeline: Arc<LaunchPipeline>,
    pub start_time: Instant,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(err: &ReachError) -> ErrorReply {
    let (status, code) = match err {
        ReachError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
        ReachError::Import(_) => (StatusCode::UNPROCESSABLE_ENTITY, "import_failed"),
        ReachError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        ReachError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        ReachError::Batch { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "batch_failed"),
        ReachError::Dispatch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "dispatch_failed"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

fn session_not_found(id: Uuid) -> ErrorReply {
    error_reply(&ReachError::NotFound(format!("wizard session {id}")))
}

/// Tenant scope from the `X-Tenant-Id` header. A fresh development
/// instance answers for the seeded demo tenant when the header is
/// absent or unparseable.
fn tenant_from(headers: &HeaderMap) -> Uuid {
    headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(demo_tenant_id)
}

fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("agent")
        .to_string()
}

// ─── Wizard sessions ───────────────────────────────────────────────────────

pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<SessionView>) {
    let view = state.sessions.create(tenant_from(&headers));
    (StatusCode::CREATED, Json(view))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ErrorReply> {
    state
        .sessions
        .get(id)
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

pub async fn abandon_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.sessions.remove(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Partial draft update; only supplied fields are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DraftUpdate {
    pub channel: Option<Channel>,
    pub connection_id: Option<Uuid>,
    pub kind: Option<CampaignKind>,
    pub template_id: Option<Uuid>,
    pub custom_content: Option<String>,
    pub audience_method: Option<AudienceMethod>,
    pub selected_leads: Option<Vec<Uuid>>,
    pub send_now: Option<bool>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
}

/// PATCH /api/v1/wizard/{id}/draft — applies the supplied fields to the
/// draft. Naming the select-all audience method refreshes its count
/// from the lead book of the tenant the session was opened for.
pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DraftUpdate>,
) -> Result<Json<SessionView>, ErrorReply> {
    if update.template_id.is_some() && update.custom_content.is_some() {
        return Err(error_reply(&ReachError::Validation(
            "Pick a template or write custom content, not both.".to_string(),
        )));
    }

    let select_all_count = match update.audience_method {
        Some(AudienceMethod::SelectAll) => {
            // Count against the session's own tenant, the one submission
            // will resolve recipients for.
            let tenant_id = state
                .sessions
                .get(id)
                .ok_or_else(|| session_not_found(id))?
                .tenant_id;
            Some(
                state
                    .leads
                    .count_with_phone(tenant_id)
                    .await
                    .map_err(|e| error_reply(&e))?,
            )
        }
        _ => None,
    };

    state
        .sessions
        .update(id, move |session| {
            if let Some(channel) = update.channel {
                session.draft.set_channel(channel);
            }
            if let Some(connection_id) = update.connection_id {
                session.draft.connection_id = Some(connection_id);
            }
            if let Some(kind) = update.kind {
                session.draft.kind = Some(kind);
            }
            if let Some(template_id) = update.template_id {
                session.draft.select_template(template_id);
            }
            if let Some(content) = update.custom_content {
                session.draft.set_custom_content(content);
            }
            if let Some(method) = update.audience_method {
                session.draft.audience_method = method;
            }
            if let Some(count) = select_all_count {
                session.draft.select_all_count = Some(count);
            }
            if let Some(selected) = update.selected_leads {
                session.draft.selected_leads = selected;
            }
            if let Some(send_now) = update.send_now {
                session.draft.send_now = send_now;
            }
            if update.scheduled_at.is_some() {
                session.draft.scheduled_at = update.scheduled_at;
            }
            if update.timezone.is_some() {
                session.draft.timezone = update.timezone;
            }
        })
        .map(|(_, view)| Json(view))
        .ok_or_else(|| session_not_found(id))
}

pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ErrorReply> {
    match state.sessions.update(id, |session| session.advance()) {
        Some((Ok(_), view)) => Ok(Json(view)),
        Some((Err(e), _)) => {
            metrics::counter!("wizard.step_rejections").increment(1);
            Err(error_reply(&e))
        }
        None => Err(session_not_found(id)),
    }
}

pub async fn back_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ErrorReply> {
    state
        .sessions
        .update(id, |session| session.back())
        .map(|(_, view)| Json(view))
        .ok_or_else(|| session_not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub step: WizardStep,
}

pub async fn jump_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JumpRequest>,
) -> Result<Json<SessionView>, ErrorReply> {
    match state.sessions.update(id, |session| session.jump_to(req.step)) {
        Some((true, view)) => Ok(Json(view)),
        Some((false, _)) => Err(error_reply(&ReachError::Validation(
            "That step has not been reached yet.".to_string(),
        ))),
        None => Err(session_not_found(id)),
    }
}

// ─── Spreadsheet import ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub row_count: usize,
    pub suggested_mapping: ColumnMapping,
}

/// POST /api/v1/wizard/{id}/import — parses a raw delimited upload and
/// stashes it on the session until the column mapping is confirmed.
pub async fn upload_sheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ImportPreview>, ErrorReply> {
    let sheet = parse_sheet(body.as_ref()).map_err(|e| {
        warn!(session_id = %id, error = %e, "Import upload rejected");
        error_reply(&e)
    })?;

    let preview = ImportPreview {
        headers: sheet.headers.clone(),
        row_count: sheet.row_count(),
        suggested_mapping: ColumnMapping::detect(&sheet.headers),
    };

    state
        .sessions
        .update(id, move |session| {
            session.pending_sheet = Some(sheet);
        })
        .ok_or_else(|| session_not_found(id))?;

    metrics::counter!("wizard.imports.uploaded").increment(1);
    Ok(Json(preview))
}

/// POST /api/v1/wizard/{id}/import/finalize — applies the confirmed
/// mapping. On success the imported rows become the draft's audience
/// and the pending upload is discarded; on failure the upload is kept
/// so the mapping can be corrected.
pub async fn finalize_import(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mapping): Json<ColumnMapping>,
) -> Result<Json<SessionView>, ErrorReply> {
    let result = state.sessions.update(id, move |session| {
        let Some(sheet) = session.pending_sheet.as_ref() else {
            return Err(ReachError::Import(
                "No uploaded file to finalize. Upload a spreadsheet first.".to_string(),
            ));
        };
        let imported = finalize(sheet, &mapping)?;
        session.draft.imported_leads = imported;
        session.draft.audience_method = AudienceMethod::ExcelImport;
        session.pending_sheet = None;
        Ok(())
    });

    match result {
        Some((Ok(()), view)) => {
            metrics::counter!("wizard.imports.finalized").increment(1);
            Ok(Json(view))
        }
        Some((Err(e), _)) => Err(error_reply(&e)),
        None => Err(session_not_found(id)),
    }
}

// ─── Submission ────────────────────────────────────────────────────────────

/// POST /api/v1/wizard/{id}/submit — runs the launch pipeline on the
/// session's draft. A second submit while one is in flight gets 409; a
/// successful one resets the session to a fresh wizard.
pub async fn submit_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<LaunchReport>, ErrorReply> {
    let (tenant_id, draft) = state.sessions.begin_submit(id).map_err(|e| error_reply(&e))?;
    let actor = actor_from(&headers);

    let result = state.pipeline.submit(tenant_id, &actor, &draft).await;
    state.sessions.end_submit(id, result.is_ok());

    match result {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!(session_id = %id, error = %e, "Campaign submission failed");
            metrics::counter!("api.errors").increment(1);
            Err(error_reply(&e))
        }
    }
}

// ─── CRM lookups ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChannelFilter {
    pub channel: Option<Channel>,
}

pub async fn list_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Lead>>, ErrorReply> {
    state
        .leads
        .list(tenant_from(&headers))
        .await
        .map(Json)
        .map_err(|e| error_reply(&e))
}

pub async fn list_connections(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<ChannelFilter>,
) -> Json<Vec<ChannelConnection>> {
    Json(state.connections.list(tenant_from(&headers), filter.channel))
}

pub async fn list_templates(
    State(state): State<AppState>,
    Query(filter): Query<ChannelFilter>,
) -> Json<Vec<MessageTemplate>> {
    Json(state.templates.list(filter.channel))
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<CampaignRecord>>, ErrorReply> {
    state
        .campaigns
        .list_campaigns(tenant_from(&headers))
        .await
        .map(Json)
        .map_err(|e| error_reply(&e))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CampaignRecord>, ErrorReply> {
    state
        .campaigns
        .get_campaign(id)
        .await
        .map_err(|e| error_reply(&e))?
        .filter(|c| c.tenant_id == tenant_from(&headers))
        .map(Json)
        .ok_or_else(|| error_reply(&ReachError::NotFound(format!("campaign {id}"))))
}

pub async fn campaign_recipients(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<CampaignRecipient>>, ErrorReply> {
    let owned = state
        .campaigns
        .get_campaign(id)
        .await
        .map_err(|e| error_reply(&e))?
        .is_some_and(|c| c.tenant_id == tenant_from(&headers));
    if !owned {
        return Err(error_reply(&ReachError::NotFound(format!("campaign {id}"))));
    }

    state
        .recipients
        .for_campaign(id)
        .await
        .map(Json)
        .map_err(|e| error_reply(&e))
}

pub async fn audit_log(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AuditEntry>>, ErrorReply> {
    state
        .audit
        .recent(tenant_from(&headers))
        .await
        .map(Json)
        .map_err(|e| error_reply(&e))
}

// ─── Operational ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe for Kubernetes.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use propreach_audience::AudienceResolver;
    use propreach_core::notify::noop_notifier;
    use propreach_crm::seed::seed_demo_data;
    use propreach_crm::MemoryLeadStore;
    use propreach_launch::{LocalDispatchTrigger, MemoryStore};

    fn make_state() -> AppState {
        let leads = Arc::new(MemoryLeadStore::new());
        let connections = Arc::new(ConnectionDirectory::new());
        let templates = Arc::new(TemplateCatalog::new());
        seed_demo_data(&leads, &connections, &templates);

        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(LaunchPipeline::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            AudienceResolver::new(leads.clone()),
            Arc::new(LocalDispatchTrigger),
            noop_notifier(),
        ));

        AppState {
            sessions: Arc::new(SessionStore::new()),
            leads,
            connections,
            templates,
            campaigns: store.clone(),
            recipients: store.clone(),
            audit: store,
            pipeline,
            start_time: Instant::now(),
        }
    }

    fn select_all_update() -> DraftUpdate {
        DraftUpdate {
            audience_method: Some(AudienceMethod::SelectAll),
            ..DraftUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_select_all_refresh_counts_the_session_tenant() {
        let state = make_state();

        // Session for a brand-new tenant; only the demo tenant has leads.
        let tenant = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", tenant.to_string().parse().unwrap());
        let (_, Json(created)) = create_session(State(state.clone()), headers).await;

        let Json(view) =
            update_draft(State(state.clone()), Path(created.id), Json(select_all_update()))
                .await
                .unwrap();

        // The seeded demo book must not leak into a foreign session's count.
        let demo_count = state.leads.count_with_phone(demo_tenant_id()).await.unwrap();
        assert!(demo_count > 0);
        assert_eq!(view.draft.select_all_count, Some(0));
        assert_eq!(view.audience_count, 0);

        // A session opened for the demo tenant sees its own live count.
        let (_, Json(demo)) = create_session(State(state.clone()), HeaderMap::new()).await;
        let Json(view) = update_draft(State(state), Path(demo.id), Json(select_all_update()))
            .await
            .unwrap();
        assert_eq!(view.draft.select_all_count, Some(demo_count));
        assert_eq!(view.audience_count, demo_count);
    }
}
