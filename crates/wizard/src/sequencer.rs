use std::collections::HashSet;

use propreach_core::{ReachError, ReachResult};
use serde::Serialize;
use tracing::debug;

use crate::draft::CampaignDraft;
use crate::steps::WizardStep;
use crate::validator;

/// Linear finite-state machine over the fixed wizard step list. Tracks
/// the current step and which steps have been completed; every forward
/// transition is gated by the step validator.
#[derive(Debug, Clone, Serialize)]
pub struct StepSequencer {
    pub current: WizardStep,
    pub completed: HashSet<WizardStep>,
}

impl StepSequencer {
    /// Starts at the first step with nothing completed.
    pub fn new() -> Self {
        Self {
            current: WizardStep::Channel,
            completed: HashSet::new(),
        }
    }

    /// Attempts to move forward. When the current step's gate fails the
    /// sequencer stays put, nothing is marked completed, and the error
    /// carries the step's rejection reason. At the terminal step a passing
    /// gate marks it completed without moving.
    pub fn advance(&mut self, draft: &CampaignDraft) -> ReachResult<WizardStep> {
        if !validator::can_proceed(self.current, draft) {
            debug!(step = ?self.current, "step gate rejected advance");
            return Err(ReachError::Validation(
                validator::rejection_reason(self.current).to_string(),
            ));
        }
        self.completed.insert(self.current);
        if let Some(next) = self.current.next() {
            self.current = next;
        }
        Ok(self.current)
    }

    /// Moves to the preceding step unconditionally; no-op at the first.
    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.current.prev() {
            self.current = prev;
        }
        self.current
    }

    /// Jumps directly to `step` when it was already completed or sits at
    /// or before the current position. Skipping ahead is refused with a
    /// `false` return and no state change, whatever UI affordance asked.
    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        if self.completed.contains(&step) || step.position() <= self.current.position() {
            self.current = step;
            true
        } else {
            false
        }
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propreach_core::types::{AudienceMethod, CampaignKind, Channel};
    use uuid::Uuid;

    fn make_complete_draft() -> CampaignDraft {
        let mut draft = CampaignDraft::new();
        draft.set_channel(Channel::Whatsapp);
        draft.connection_id = Some(Uuid::new_v4());
        draft.kind = Some(CampaignKind::PropertyPromotion);
        draft.set_custom_content("New listing this week");
        draft.audience_method = AudienceMethod::Manual;
        draft.selected_leads = vec![Uuid::new_v4()];
        draft.send_now = true;
        draft
    }

    #[test]
    fn test_advance_walks_the_full_order() {
        let draft = make_complete_draft();
        let mut seq = StepSequencer::new();

        for expected in crate::steps::STEP_ORDER.iter().skip(1) {
            assert_eq!(seq.advance(&draft).unwrap(), *expected);
        }
        assert_eq!(seq.current, WizardStep::Review);
        // Terminal step: advancing again stays put
        assert_eq!(seq.advance(&draft).unwrap(), WizardStep::Review);
        assert!(seq.is_completed(WizardStep::Review));
    }

    #[test]
    fn test_failed_gate_leaves_state_untouched() {
        let draft = CampaignDraft::new();
        let mut seq = StepSequencer::new();

        let err = seq.advance(&draft).unwrap_err();
        assert!(matches!(err, ReachError::Validation(_)));
        assert_eq!(seq.current, WizardStep::Channel);
        assert!(seq.completed.is_empty());
    }

    #[test]
    fn test_rejection_carries_the_step_reason() {
        let mut draft = make_complete_draft();
        draft.selected_leads.clear();
        let mut seq = StepSequencer::new();
        for _ in 0..4 {
            seq.advance(&draft).unwrap();
        }
        assert_eq!(seq.current, WizardStep::Audience);

        let err = seq.advance(&draft).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Select at least one recipient before continuing."
        );
    }

    #[test]
    fn test_back_is_unconditional_and_stops_at_first() {
        let draft = make_complete_draft();
        let mut seq = StepSequencer::new();
        seq.advance(&draft).unwrap();
        seq.advance(&draft).unwrap();
        assert_eq!(seq.current, WizardStep::CampaignType);

        assert_eq!(seq.back(), WizardStep::Connection);
        assert_eq!(seq.back(), WizardStep::Channel);
        assert_eq!(seq.back(), WizardStep::Channel);
    }

    #[test]
    fn test_jump_allows_completed_and_passed_steps_only() {
        let draft = make_complete_draft();
        let mut seq = StepSequencer::new();
        seq.advance(&draft).unwrap();
        seq.advance(&draft).unwrap();
        assert_eq!(seq.current, WizardStep::CampaignType);

        // Backward: allowed
        assert!(seq.jump_to(WizardStep::Channel));
        assert_eq!(seq.current, WizardStep::Channel);

        // Reached but never completed: not jumpable from an earlier step
        assert!(!seq.jump_to(WizardStep::CampaignType));
        assert_eq!(seq.current, WizardStep::Channel);

        // Completed: jumpable from anywhere
        assert!(seq.jump_to(WizardStep::Connection));
        assert_eq!(seq.current, WizardStep::Connection);

        // Skipping ahead: refused, no state change
        assert!(!seq.jump_to(WizardStep::Schedule));
        assert_eq!(seq.current, WizardStep::Connection);
    }
}
