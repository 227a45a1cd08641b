//! Store seams the submission pipeline writes through. Backed by the
//! in-memory [`crate::memory::MemoryStore`] in development; a hosted
//! database implements the same traits in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use propreach_core::types::{
    AnalyticsSnapshot, AudienceMethod, AuditEntry, CampaignKind, CampaignRecipient,
    CampaignRecord, CampaignStatus, Channel,
};
use propreach_core::ReachResult;
use uuid::Uuid;

/// Everything needed to create a campaign record; the store assigns the
/// id and timestamps.
#[derive(Debug, Clone)]
pub struct NewCampaign {
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
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Writes one campaign record and returns its assigned id.
    async fn create_campaign(&self, new: NewCampaign) -> ReachResult<Uuid>;

    /// Single-record status write. Used by the pipeline only for the
    /// best-effort demotion to draft after a failed recipient batch.
    async fn update_status(&self, id: Uuid, status: CampaignStatus) -> ReachResult<()>;

    async fn get_campaign(&self, id: Uuid) -> ReachResult<Option<CampaignRecord>>;

    async fn list_campaigns(&self, tenant_id: Uuid) -> ReachResult<Vec<CampaignRecord>>;
}

#[async_trait]
pub trait RecipientStore: Send + Sync {
    /// Bulk-writes one batch. Succeeds or fails atomically per call; the
    /// pipeline never assumes partial success within a batch.
    async fn insert_batch(&self, recipients: &[CampaignRecipient]) -> ReachResult<()>;

    async fn for_campaign(&self, campaign_id: Uuid) -> ReachResult<Vec<CampaignRecipient>>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn record_snapshot(&self, snapshot: AnalyticsSnapshot) -> ReachResult<()>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> ReachResult<()>;

    async fn recent(&self, tenant_id: Uuid) -> ReachResult<Vec<AuditEntry>>;
}
