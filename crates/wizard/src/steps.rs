use serde::{Deserialize, Serialize};

/// One named stage of the linear campaign wizard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Channel,
    Connection,
    #[serde(rename = "type")]
    CampaignType,
    Template,
    Audience,
    Schedule,
    Review,
}

/// The fixed step order the wizard walks through.
pub const STEP_ORDER: [WizardStep; 7] = [
    WizardStep::Channel,
    WizardStep::Connection,
    WizardStep::CampaignType,
    WizardStep::Template,
    WizardStep::Audience,
    WizardStep::Schedule,
    WizardStep::Review,
];

impl WizardStep {
    pub fn position(&self) -> usize {
        STEP_ORDER
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::Channel => "Channel",
            WizardStep::Connection => "Connection",
            WizardStep::CampaignType => "Campaign Type",
            WizardStep::Template => "Content",
            WizardStep::Audience => "Audience",
            WizardStep::Schedule => "Schedule",
            WizardStep::Review => "Review",
        }
    }

    /// The following step, or `None` at the terminal step.
    pub fn next(&self) -> Option<WizardStep> {
        STEP_ORDER.get(self.position() + 1).copied()
    }

    /// The preceding step, or `None` at the first step.
    pub fn prev(&self) -> Option<WizardStep> {
        self.position().checked_sub(1).map(|p| STEP_ORDER[p])
    }

    pub fn is_first(&self) -> bool {
        *self == STEP_ORDER[0]
    }

    pub fn is_last(&self) -> bool {
        *self == STEP_ORDER[STEP_ORDER.len() - 1]
    }
}
