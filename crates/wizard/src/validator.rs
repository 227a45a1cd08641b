//! Step gates. Pure functions so every rule is testable without a
//! sequencer or a store in the picture.

use crate::draft::CampaignDraft;
use crate::steps::WizardStep;

/// Whether the wizard may advance past `step` given the draft's state.
pub fn can_proceed(step: WizardStep, draft: &CampaignDraft) -> bool {
    match step {
        WizardStep::Channel => draft.channel().is_some(),
        WizardStep::Connection => draft.connection_id.is_some(),
        WizardStep::CampaignType => draft.kind.is_some(),
        WizardStep::Template => {
            draft.template_id().is_some() || draft.custom_content().is_some_and(|c| !c.is_empty())
        }
        WizardStep::Audience => draft.audience_count() > 0,
        WizardStep::Schedule => draft.send_now || draft.scheduled_at.is_some(),
        WizardStep::Review => true,
    }
}

/// Human-readable reason shown when a step's gate holds the user back.
pub fn rejection_reason(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Connection => "Select a connected account before continuing.",
        WizardStep::Audience => "Select at least one recipient before continuing.",
        _ => "Complete this step before continuing.",
    }
}
