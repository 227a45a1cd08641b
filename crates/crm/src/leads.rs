//! Lead book access — the CRM contact list a campaign audience is drawn
//! from.
//!
//! The trait is the seam the wizard and resolver work against. Production:
//! replace the in-memory store with PostgreSQL (sqlx) or similar ACID
//! store; this provides the same API surface for development and testing.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use propreach_core::types::Lead;
use propreach_core::ReachResult;
use tracing::info;
use uuid::Uuid;

/// Read access to a tenant's leads, scoped the way the audience step
/// needs it.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn add(&self, lead: Lead) -> ReachResult<Uuid>;

    /// Fetch leads by id, preserving the order of `ids`. Unknown ids and
    /// leads of other tenants are silently skipped.
    async fn by_ids(&self, tenant_id: Uuid, ids: &[Uuid]) -> ReachResult<Vec<Lead>>;

    /// Every lead of the tenant that has a non-empty phone number.
    async fn with_phone(&self, tenant_id: Uuid) -> ReachResult<Vec<Lead>>;

    /// Count of leads `with_phone` would return, without materializing
    /// them. Used to keep the select-all audience count live.
    async fn count_with_phone(&self, tenant_id: Uuid) -> ReachResult<u64>;

    async fn list(&self, tenant_id: Uuid) -> ReachResult<Vec<Lead>>;
}

/// Thread-safe in-memory lead book backed by DashMap.
#[derive(Default)]
pub struct MemoryLeadStore {
    leads: DashMap<Uuid, Lead>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        info!("Lead store initialized (in-memory, development mode)");
        Self {
            leads: DashMap::new(),
        }
    }

    pub fn insert(&self, lead: Lead) -> Uuid {
        let id = lead.id;
        self.leads.insert(id, lead);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Lead> {
        self.leads.get(&id).map(|r| r.value().clone())
    }

    fn tenant_leads(&self, tenant_id: Uuid) -> Vec<Lead> {
        self.leads
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn add(&self, lead: Lead) -> ReachResult<Uuid> {
        Ok(self.insert(lead))
    }

    async fn by_ids(&self, tenant_id: Uuid, ids: &[Uuid]) -> ReachResult<Vec<Lead>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get(*id))
            .filter(|l| l.tenant_id == tenant_id)
            .collect())
    }

    async fn with_phone(&self, tenant_id: Uuid) -> ReachResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .tenant_leads(tenant_id)
            .into_iter()
            .filter(Lead::has_phone)
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn count_with_phone(&self, tenant_id: Uuid) -> ReachResult<u64> {
        Ok(self
            .leads
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id && r.value().has_phone())
            .count() as u64)
    }

    async fn list(&self, tenant_id: Uuid) -> ReachResult<Vec<Lead>> {
        let mut leads = self.tenant_leads(tenant_id);
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }
}

/// Build a lead for insertion, filling the generated fields.
pub fn make_lead(
    tenant_id: Uuid,
    name: impl Into<String>,
    phone: Option<&str>,
    email: Option<&str>,
) -> Lead {
    Lead {
        id: Uuid::new_v4(),
        tenant_id,
        name: name.into(),
        phone: phone.map(|p| p.to_string()),
        email: email.map(|e| e.to_string()),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_by_ids_preserves_order_and_skips_unknown() {
        let store = MemoryLeadStore::new();
        let tenant = Uuid::new_v4();
        let a = store.insert(make_lead(tenant, "Amina", Some("+971501111111"), None));
        let b = store.insert(make_lead(tenant, "Bilal", Some("+971502222222"), None));

        let leads = store
            .by_ids(tenant, &[b, Uuid::new_v4(), a])
            .await
            .unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name, "Bilal");
        assert_eq!(leads[1].name, "Amina");
    }

    #[tokio::test]
    async fn test_by_ids_is_tenant_scoped() {
        let store = MemoryLeadStore::new();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let foreign = store.insert(make_lead(other, "Foreign", Some("+1000"), None));

        let leads = store.by_ids(tenant, &[foreign]).await.unwrap();
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn test_with_phone_filters_blank_numbers() {
        let store = MemoryLeadStore::new();
        let tenant = Uuid::new_v4();
        store.insert(make_lead(tenant, "Has phone", Some("+971501111111"), None));
        store.insert(make_lead(tenant, "No phone", None, Some("x@y.com")));
        store.insert(make_lead(tenant, "Blank phone", Some("  "), None));

        let leads = store.with_phone(tenant).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Has phone");
        assert_eq!(store.count_with_phone(tenant).await.unwrap(), 1);
    }
}
