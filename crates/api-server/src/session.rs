//! Wizard sessions — one per in-progress campaign draft.
//!
//! The draft and its step sequencer live here between requests; nothing
//! touches the campaign store until the session is submitted.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use propreach_audience::ImportSheet;
use propreach_core::{ReachError, ReachResult};
use propreach_wizard::{CampaignDraft, StepSequencer, WizardStep, STEP_ORDER};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use uuid::Uuid;

/// One agent's in-progress wizard.
pub struct WizardSession {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub draft: CampaignDraft,
    pub sequencer: StepSequencer,
    /// Parsed upload awaiting column-mapping confirmation.
    pub pending_sheet: Option<ImportSheet>,
    /// Set while a submit is in flight; a second submit is refused
    /// until the first resolves.
    submitting: AtomicBool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn advance(&mut self) -> ReachResult<WizardStep> {
        self.sequencer.advance(&self.draft)
    }

    pub fn back(&mut self) -> WizardStep {
        self.sequencer.back()
    }

    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        self.sequencer.jump_to(step)
    }

    fn view(&self) -> SessionView {
        let completed_steps = STEP_ORDER
            .into_iter()
            .filter(|s| self.sequencer.is_completed(*s))
            .collect();
        SessionView {
            id: self.id,
            tenant_id: self.tenant_id,
            current_step: self.sequencer.current,
            completed_steps,
            audience_count: self.draft.audience_count(),
            draft: self.draft.clone(),
            pending_import_rows: self.pending_sheet.as_ref().map(ImportSheet::row_count),
            updated_at: self.updated_at,
        }
    }
}

/// Serializable snapshot of a session for API responses. Completed
/// steps are listed in wizard order.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub current_step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
    pub audience_count: u64,
    pub draft: CampaignDraft,
    pub pending_import_rows: Option<usize>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory session registry.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, WizardSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        info!("Wizard session store initialized (in-memory, development mode)");
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Opens a fresh wizard for the tenant.
    pub fn create(&self, tenant_id: Uuid) -> SessionView {
        let now = Utc::now();
        let session = WizardSession {
            id: Uuid::new_v4(),
            tenant_id,
            draft: CampaignDraft::new(),
            sequencer: StepSequencer::new(),
            pending_sheet: None,
            submitting: AtomicBool::new(false),
            created_at: now,
            updated_at: now,
        };
        let view = session.view();
        self.sessions.insert(session.id, session);
        metrics::counter!("wizard.sessions.created").increment(1);
        view
    }

    pub fn get(&self, id: Uuid) -> Option<SessionView> {
        self.sessions.get(&id).map(|s| s.view())
    }

    /// Runs `f` against the session and refreshes its update timestamp.
    /// `None` when the session does not exist.
    pub fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut WizardSession) -> T,
    ) -> Option<(T, SessionView)> {
        let mut session = self.sessions.get_mut(&id)?;
        let out = f(&mut session);
        session.updated_at = Utc::now();
        Some((out, session.view()))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Claims the session's submit slot and snapshots the draft.
    /// Refused when the wizard is not at the review step or a submit is
    /// already running. Draft validity itself is the pipeline's check.
    pub fn begin_submit(&self, id: Uuid) -> ReachResult<(Uuid, CampaignDraft)> {
        let session = self
            .sessions
            .get(&id)
            .ok_or_else(|| ReachError::NotFound(format!("wizard session {id}")))?;

        if session.sequencer.current != WizardStep::Review {
            return Err(ReachError::Validation(
                "Submission is only available from the review step.".to_string(),
            ));
        }
        if session
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ReachError::Conflict(
                "A submission is already in progress for this session.".to_string(),
            ));
        }
        Ok((session.tenant_id, session.draft.clone()))
    }

    /// Releases the submit slot. A successful submission resets the
    /// wizard to a fresh draft at the first step.
    pub fn end_submit(&self, id: Uuid, success: bool) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            if success {
                session.draft = CampaignDraft::new();
                session.sequencer = StepSequencer::new();
                session.pending_sheet = None;
            }
            session.updated_at = Utc::now();
            session.submitting.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use propreach_core::types::{AudienceMethod, CampaignKind, Channel};

    fn make_complete_draft() -> CampaignDraft {
        let mut draft = CampaignDraft::new();
        draft.set_channel(Channel::Whatsapp);
        draft.connection_id = Some(Uuid::new_v4());
        draft.kind = Some(CampaignKind::Drip);
        draft.set_custom_content("Hi!");
        draft.audience_method = AudienceMethod::Manual;
        draft.selected_leads = vec![Uuid::new_v4()];
        draft.send_now = true;
        draft
    }

    fn drive_to_review(store: &SessionStore, id: Uuid) {
        store
            .update(id, |session| {
                session.draft = make_complete_draft();
                while session.sequencer.current != WizardStep::Review {
                    session.advance().unwrap();
                }
            })
            .unwrap();
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let store = SessionStore::new();
        let tenant = Uuid::new_v4();

        let view = store.create(tenant);
        assert_eq!(view.tenant_id, tenant);
        assert_eq!(view.current_step, WizardStep::Channel);
        assert!(view.completed_steps.is_empty());
        assert_eq!(view.audience_count, 0);

        let again = store.get(view.id).unwrap();
        assert_eq!(again.id, view.id);
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_submit_is_only_available_from_the_review_step() {
        let store = SessionStore::new();
        let view = store.create(Uuid::new_v4());

        let err = store.begin_submit(view.id).unwrap_err();
        assert!(matches!(err, ReachError::Validation(_)));
        assert!(err.to_string().contains("review step"));
    }

    #[test]
    fn test_second_submit_is_refused_while_one_is_in_flight() {
        let store = SessionStore::new();
        let view = store.create(Uuid::new_v4());
        drive_to_review(&store, view.id);

        let (tenant, draft) = store.begin_submit(view.id).unwrap();
        assert_eq!(tenant, view.tenant_id);
        assert_eq!(draft.audience_count(), 1);

        let err = store.begin_submit(view.id).unwrap_err();
        assert!(matches!(err, ReachError::Conflict(_)));

        // A failed submit releases the slot without resetting the wizard
        store.end_submit(view.id, false);
        assert!(store.begin_submit(view.id).is_ok());
    }

    #[test]
    fn test_successful_submit_resets_the_wizard() {
        let store = SessionStore::new();
        let view = store.create(Uuid::new_v4());
        drive_to_review(&store, view.id);

        store.begin_submit(view.id).unwrap();
        store.end_submit(view.id, true);

        let fresh = store.get(view.id).unwrap();
        assert_eq!(fresh.current_step, WizardStep::Channel);
        assert!(fresh.completed_steps.is_empty());
        assert_eq!(fresh.audience_count, 0);
        assert!(fresh.draft.channel().is_none());

        // And the slot is free for the next campaign
        let err = store.begin_submit(view.id).unwrap_err();
        assert!(matches!(err, ReachError::Validation(_)));
    }
}
