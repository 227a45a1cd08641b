pub mod draft;
pub mod sequencer;
pub mod steps;
pub mod validator;

pub use draft::CampaignDraft;
pub use sequencer::StepSequencer;
pub use steps::{WizardStep, STEP_ORDER};
pub use validator::{can_proceed, rejection_reason};
