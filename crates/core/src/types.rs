use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outreach channel a campaign is delivered over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Whatsapp,
    Email,
    Sms,
}

impl Channel {
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Whatsapp => "WhatsApp",
            Channel::Email => "Email",
            Channel::Sms => "SMS",
        }
    }
}

/// Marketing purpose of a campaign, chosen at the type step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignKind {
    LeadNurturing,
    Drip,
    PropertyPromotion,
    Event,
    OpenHouse,
    Newsletter,
}

/// Lifecycle of a campaign record. The wizard writes `sending` and
/// `scheduled` at creation and demotes to `draft` on a failed recipient
/// write; `sent` and `failed` are owned by the downstream dispatcher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
    Failed,
}

/// How the audience step picks recipients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudienceMethod {
    Manual,
    SelectAll,
    ExcelImport,
}

/// Provenance tag persisted on every recipient row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecipientSource {
    ManualSelection,
    SelectAll,
    ExcelImport,
}

/// Per-recipient delivery state. This subsystem only ever writes `queued`;
/// later states arrive from the dispatcher through its own channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Delivered,
    Read,
    Failed,
}

/// A contact in the tenant's lead book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Whether the lead can actually be messaged. Empty strings count as
    /// missing, which matters for imported books with blank cells.
    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Active,
    Expired,
    Revoked,
}

/// A provider account the tenant has connected for one channel
/// (a WhatsApp Business number, an SMTP sender, an SMS gateway).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConnection {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub channel: Channel,
    pub name: String,
    pub provider: String,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Draft,
    Active,
    Archived,
}

/// Reusable message template (channel-scoped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: Uuid,
    pub channel: Channel,
    pub name: String,
    pub body: String,
    pub status: TemplateStatus,
}

/// Persisted snapshot of a submitted campaign draft.
///
/// `total_recipients` is the audience count the draft reported at
/// submission. It is denormalized and may exceed the number of recipient
/// rows actually written when phone-less leads get dropped during
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub channel: Channel,
    pub kind: CampaignKind,
    pub connection_id: Uuid,
    pub template_id: Option<Uuid>,
    pub custom_content: Option<String>,
    pub status: CampaignStatus,
    pub send_now: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub timezone: String,
    pub audience_method: AudienceMethod,
    pub total_recipients: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One queued destination for a campaign. Written once, never updated
/// here; delivery-state transitions belong to the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecipient {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    /// Present when the recipient came from the lead book; `None` for
    /// spreadsheet imports.
    pub lead_id: Option<Uuid>,
    pub imported_from: RecipientSource,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

/// One row produced by the spreadsheet import flow after column mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportedLead {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Point-in-time recipient counts captured when a campaign is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub total_recipients: u64,
    pub queued_recipients: u64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Submit,
    Dispatch,
}

/// Audit trail entry for tenant-visible actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Standard error body returned by the REST surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
