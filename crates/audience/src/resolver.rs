//! Turns a draft's audience selection into concrete recipients.

use std::sync::Arc;

use propreach_core::types::{AudienceMethod, Lead, RecipientSource};
use propreach_core::ReachResult;
use propreach_crm::LeadStore;
use propreach_wizard::CampaignDraft;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// One resolved message target, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRecipient {
    pub phone: String,
    pub name: Option<String>,
    pub lead_id: Option<Uuid>,
    pub imported_from: RecipientSource,
}

/// Resolves the three mutually exclusive audience modes against the lead
/// book. Counting and resolving are separate because the UI shows counts
/// continuously while the list only materializes at submission.
pub struct AudienceResolver {
    leads: Arc<dyn LeadStore>,
}

impl AudienceResolver {
    pub fn new(leads: Arc<dyn LeadStore>) -> Self {
        Self { leads }
    }

    /// The audience count for display. Select-all asks the lead book so
    /// the number tracks the live "has a phone" population; the other
    /// modes count what the draft already holds.
    pub async fn live_count(&self, tenant_id: Uuid, draft: &CampaignDraft) -> ReachResult<u64> {
        match draft.audience_method {
            AudienceMethod::Manual => Ok(draft.selected_leads.len() as u64),
            AudienceMethod::ExcelImport => Ok(draft.imported_leads.len() as u64),
            AudienceMethod::SelectAll => self.leads.count_with_phone(tenant_id).await,
        }
    }

    /// Materializes the recipient list at submission time.
    ///
    /// Manual mode silently drops selected leads without a phone, so the
    /// list may be shorter than the count the draft reported.
    pub async fn resolve(
        &self,
        tenant_id: Uuid,
        draft: &CampaignDraft,
    ) -> ReachResult<Vec<ResolvedRecipient>> {
        let recipients: Vec<ResolvedRecipient> = match draft.audience_method {
            AudienceMethod::Manual => self
                .leads
                .by_ids(tenant_id, &draft.selected_leads)
                .await?
                .iter()
                .filter_map(|lead| lead_recipient(lead, RecipientSource::ManualSelection))
                .collect(),
            AudienceMethod::SelectAll => self
                .leads
                .with_phone(tenant_id)
                .await?
                .iter()
                .filter_map(|lead| lead_recipient(lead, RecipientSource::SelectAll))
                .collect(),
            AudienceMethod::ExcelImport => draft
                .imported_leads
                .iter()
                .map(|lead| ResolvedRecipient {
                    phone: lead.phone.clone(),
                    name: lead.name.clone(),
                    lead_id: None,
                    imported_from: RecipientSource::ExcelImport,
                })
                .collect(),
        };
        debug!(
            method = ?draft.audience_method,
            resolved = recipients.len(),
            "resolved audience"
        );
        Ok(recipients)
    }
}

fn lead_recipient(lead: &Lead, imported_from: RecipientSource) -> Option<ResolvedRecipient> {
    if !lead.has_phone() {
        return None;
    }
    lead.phone.as_ref().map(|phone| ResolvedRecipient {
        phone: phone.clone(),
        name: Some(lead.name.clone()),
        lead_id: Some(lead.id),
        imported_from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use propreach_core::types::ImportedLead;
    use propreach_crm::leads::{make_lead, MemoryLeadStore};

    fn make_store_with_book(tenant: Uuid) -> (Arc<MemoryLeadStore>, Vec<Uuid>) {
        let store = Arc::new(MemoryLeadStore::new());
        let ids = vec![
            store.insert(make_lead(tenant, "Amina", Some("+971501111111"), None)),
            store.insert(make_lead(tenant, "Bilal", Some("+971502222222"), None)),
            store.insert(make_lead(tenant, "Dana", None, Some("dana@x.com"))),
        ];
        (store, ids)
    }

    #[tokio::test]
    async fn test_manual_mode_count_and_list_diverge_on_phoneless_leads() {
        let tenant = Uuid::new_v4();
        let (store, ids) = make_store_with_book(tenant);
        let resolver = AudienceResolver::new(store);

        let mut draft = CampaignDraft::new();
        draft.audience_method = AudienceMethod::Manual;
        draft.selected_leads = ids.clone();

        // The UI count stays at the selection size
        assert_eq!(resolver.live_count(tenant, &draft).await.unwrap(), 3);

        // But the materialized list drops the phone-less lead
        let recipients = resolver.resolve(tenant, &draft).await.unwrap();
        assert_eq!(recipients.len(), 2);
        assert!(recipients
            .iter()
            .all(|r| r.imported_from == RecipientSource::ManualSelection));
        assert!(recipients.iter().all(|r| r.lead_id.is_some()));
        assert!(!recipients.iter().any(|r| r.name.as_deref() == Some("Dana")));
    }

    #[tokio::test]
    async fn test_select_all_resolves_the_phone_population() {
        let tenant = Uuid::new_v4();
        let (store, _) = make_store_with_book(tenant);
        // A second tenant's lead must not leak in
        store.insert(make_lead(Uuid::new_v4(), "Foreign", Some("+1000"), None));
        let resolver = AudienceResolver::new(store);

        let mut draft = CampaignDraft::new();
        draft.audience_method = AudienceMethod::SelectAll;

        assert_eq!(resolver.live_count(tenant, &draft).await.unwrap(), 2);
        let recipients = resolver.resolve(tenant, &draft).await.unwrap();
        assert_eq!(recipients.len(), 2);
        assert!(recipients
            .iter()
            .all(|r| r.imported_from == RecipientSource::SelectAll));
    }

    #[tokio::test]
    async fn test_excel_import_uses_the_draft_rows_verbatim() {
        let tenant = Uuid::new_v4();
        let resolver = AudienceResolver::new(Arc::new(MemoryLeadStore::new()));

        let mut draft = CampaignDraft::new();
        draft.audience_method = AudienceMethod::ExcelImport;
        draft.imported_leads = vec![
            ImportedLead {
                phone: "+1 555 0100".into(),
                name: Some("Jane Doe".into()),
                email: Some("jane@x.com".into()),
            },
            ImportedLead {
                phone: "+1 555 0101".into(),
                name: None,
                email: None,
            },
        ];

        let recipients = resolver.resolve(tenant, &draft).await.unwrap();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].phone, "+1 555 0100");
        assert_eq!(recipients[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(recipients[0].lead_id, None);
        assert_eq!(recipients[0].imported_from, RecipientSource::ExcelImport);
    }

    #[tokio::test]
    async fn test_stale_inactive_fields_are_not_consulted() {
        let tenant = Uuid::new_v4();
        let (store, ids) = make_store_with_book(tenant);
        let resolver = AudienceResolver::new(store);

        let mut draft = CampaignDraft::new();
        draft.audience_method = AudienceMethod::ExcelImport;
        draft.selected_leads = ids;
        draft.imported_leads = vec![ImportedLead {
            phone: "+1 555 0100".into(),
            name: None,
            email: None,
        }];

        let recipients = resolver.resolve(tenant, &draft).await.unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].imported_from, RecipientSource::ExcelImport);
    }
}
