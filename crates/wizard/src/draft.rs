use chrono::{DateTime, Utc};
use propreach_core::types::{AudienceMethod, CampaignKind, Channel, ImportedLead};
use serde::Serialize;
use uuid::Uuid;

/// The campaign under construction. Lives in memory for the lifetime of
/// one wizard session and is never persisted; submission consumes it and
/// a successful submission resets it.
///
/// The model holds state and enforces the template/custom-content mutual
/// exclusivity; everything else is the validator's job.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignDraft {
    channel: Option<Channel>,
    pub connection_id: Option<Uuid>,
    pub kind: Option<CampaignKind>,
    template_id: Option<Uuid>,
    custom_content: Option<String>,
    /// Determines which audience field below is authoritative. The others
    /// may hold stale values and must not be consulted.
    pub audience_method: AudienceMethod,
    pub selected_leads: Vec<Uuid>,
    pub imported_leads: Vec<ImportedLead>,
    /// Cached lead-book count for select-all mode, refreshed by the
    /// session layer whenever that mode is active.
    pub select_all_count: Option<u64>,
    pub send_now: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
}

impl CampaignDraft {
    pub fn new() -> Self {
        Self {
            channel: None,
            connection_id: None,
            kind: None,
            template_id: None,
            custom_content: None,
            audience_method: AudienceMethod::Manual,
            selected_leads: Vec::new(),
            imported_leads: Vec::new(),
            select_all_count: None,
            send_now: false,
            scheduled_at: None,
            timezone: None,
        }
    }

    /// Sets the channel. Downstream picks (connection, type, template) are
    /// kept even though they may no longer fit the new channel; the step
    /// gates re-check them on the way forward.
    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = Some(channel);
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    /// Picks a template as the content source, clearing any custom text.
    pub fn select_template(&mut self, id: Uuid) {
        self.template_id = Some(id);
        self.custom_content = None;
    }

    /// Switches to free-form content, clearing any picked template.
    pub fn set_custom_content(&mut self, text: impl Into<String>) {
        self.custom_content = Some(text.into());
        self.template_id = None;
    }

    pub fn template_id(&self) -> Option<Uuid> {
        self.template_id
    }

    pub fn custom_content(&self) -> Option<&str> {
        self.custom_content.as_deref()
    }

    /// The audience count for the active method only. For select-all this
    /// is the cached book count (0 until the first refresh); the resolved
    /// list at submission may be shorter than this number once phone-less
    /// leads are dropped.
    pub fn audience_count(&self) -> u64 {
        match self.audience_method {
            AudienceMethod::Manual => self.selected_leads.len() as u64,
            AudienceMethod::ExcelImport => self.imported_leads.len() as u64,
            AudienceMethod::SelectAll => self.select_all_count.unwrap_or(0),
        }
    }
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self::new()
    }
}
