//! In-memory launch store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use propreach_core::types::{
    AnalyticsSnapshot, AuditEntry, CampaignRecipient, CampaignRecord, CampaignStatus,
};
use propreach_core::{ReachError, ReachResult};
use tracing::info;
use uuid::Uuid;

use crate::stores::{AnalyticsStore, AuditStore, CampaignStore, NewCampaign, RecipientStore};

/// Thread-safe in-memory store for campaigns, recipients, analytics
/// snapshots, and the audit log.
#[derive(Default)]
pub struct MemoryStore {
    campaigns: DashMap<Uuid, CampaignRecord>,
    recipients: DashMap<Uuid, CampaignRecipient>,
    snapshots: DashMap<Uuid, AnalyticsSnapshot>,
    audit_log: DashMap<Uuid, AuditEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("Launch store initialized (in-memory, development mode)");
        Self {
            campaigns: DashMap::new(),
            recipients: DashMap::new(),
            snapshots: DashMap::new(),
            audit_log: DashMap::new(),
        }
    }

    pub fn snapshot_for(&self, campaign_id: Uuid) -> Option<AnalyticsSnapshot> {
        self.snapshots
            .iter()
            .find(|r| r.value().campaign_id == campaign_id)
            .map(|r| r.value().clone())
    }
}

#[async_trait]
impl CampaignStore for MemoryStore {
    async fn create_campaign(&self, new: NewCampaign) -> ReachResult<Uuid> {
        let now = Utc::now();
        let campaign = CampaignRecord {
            id: Uuid::new_v4(),
            tenant_id: new.tenant_id,
            channel: new.channel,
            kind: new.kind,
            connection_id: new.connection_id,
            template_id: new.template_id,
            custom_content: new.custom_content,
            status: new.status,
            send_now: new.send_now,
            scheduled_at: new.scheduled_at,
            timezone: new.timezone,
            audience_method: new.audience_method,
            total_recipients: new.total_recipients,
            created_at: now,
            updated_at: now,
        };
        let id = campaign.id;
        self.campaigns.insert(id, campaign);
        Ok(id)
    }

    async fn update_status(&self, id: Uuid, status: CampaignStatus) -> ReachResult<()> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| ReachError::NotFound(format!("campaign {id}")))?;
        entry.status = status;
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn get_campaign(&self, id: Uuid) -> ReachResult<Option<CampaignRecord>> {
        Ok(self.campaigns.get(&id).map(|r| r.value().clone()))
    }

    async fn list_campaigns(&self, tenant_id: Uuid) -> ReachResult<Vec<CampaignRecord>> {
        let mut campaigns: Vec<CampaignRecord> = self
            .campaigns
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }
}

#[async_trait]
impl RecipientStore for MemoryStore {
    async fn insert_batch(&self, recipients: &[CampaignRecipient]) -> ReachResult<()> {
        for recipient in recipients {
            self.recipients.insert(recipient.id, recipient.clone());
        }
        Ok(())
    }

    async fn for_campaign(&self, campaign_id: Uuid) -> ReachResult<Vec<CampaignRecipient>> {
        let mut recipients: Vec<CampaignRecipient> = self
            .recipients
            .iter()
            .filter(|r| r.value().campaign_id == campaign_id)
            .map(|r| r.value().clone())
            .collect();
        recipients.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(recipients)
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn record_snapshot(&self, snapshot: AnalyticsSnapshot) -> ReachResult<()> {
        self.snapshots.insert(snapshot.id, snapshot);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: AuditEntry) -> ReachResult<()> {
        self.audit_log.insert(entry.id, entry);
        Ok(())
    }

    async fn recent(&self, tenant_id: Uuid) -> ReachResult<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = self
            .audit_log
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propreach_core::types::{
        AudienceMethod, CampaignKind, Channel, DeliveryStatus, RecipientSource,
    };

    fn make_new_campaign(tenant_id: Uuid) -> NewCampaign {
        NewCampaign {
            tenant_id,
            channel: Channel::Whatsapp,
            kind: CampaignKind::Drip,
            connection_id: Uuid::new_v4(),
            template_id: None,
            custom_content: Some("Hi!".into()),
            status: CampaignStatus::Sending,
            send_now: true,
            scheduled_at: None,
            timezone: "+04:00".into(),
            audience_method: AudienceMethod::Manual,
            total_recipients: 2,
        }
    }

    #[tokio::test]
    async fn test_create_then_demote_campaign() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        let id = store.create_campaign(make_new_campaign(tenant)).await.unwrap();

        store
            .update_status(id, CampaignStatus::Draft)
            .await
            .unwrap();
        let campaign = store.get_campaign(id).await.unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert_eq!(campaign.total_recipients, 2);
    }

    #[tokio::test]
    async fn test_update_status_on_missing_campaign_errors() {
        let store = MemoryStore::new();
        let err = store
            .update_status(Uuid::new_v4(), CampaignStatus::Draft)
            .await
            .unwrap_err();
        assert!(matches!(err, ReachError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recipients_round_trip_per_campaign() {
        let store = MemoryStore::new();
        let campaign_id = Uuid::new_v4();
        let batch: Vec<CampaignRecipient> = (0..3)
            .map(|i| CampaignRecipient {
                id: Uuid::new_v4(),
                campaign_id,
                phone: format!("+97150000000{i}"),
                name: None,
                lead_id: None,
                imported_from: RecipientSource::ExcelImport,
                delivery_status: DeliveryStatus::Queued,
                created_at: Utc::now(),
            })
            .collect();

        store.insert_batch(&batch).await.unwrap();
        let stored = store.for_campaign(campaign_id).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored
            .iter()
            .all(|r| r.delivery_status == DeliveryStatus::Queued));
        assert!(store
            .for_campaign(Uuid::new_v4())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_campaigns_is_tenant_scoped_newest_first() {
        let store = MemoryStore::new();
        let tenant = Uuid::new_v4();
        store.create_campaign(make_new_campaign(tenant)).await.unwrap();
        store
            .create_campaign(make_new_campaign(Uuid::new_v4()))
            .await
            .unwrap();

        let campaigns = store.list_campaigns(tenant).await.unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].tenant_id, tenant);
    }
}
