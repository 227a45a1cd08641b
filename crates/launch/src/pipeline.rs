//! Submission pipeline. Consumes a finished draft and runs the staged
//! write sequence: campaign record, recipient batches, analytics
//! snapshot, audit entry, then the optional dispatch trigger.
//!
//! Stages run strictly in order. A later stage never starts before the
//! prior stage's I/O has resolved, and recipient batches are inserted
//! one at a time so "stop at the first failing batch" is well defined.

use std::sync::Arc;

use chrono::{Local, Utc};
use propreach_audience::{AudienceResolver, ResolvedRecipient};
use propreach_core::notify::{NoticeKind, Notifier};
use propreach_core::types::{
    AnalyticsSnapshot, AuditAction, AuditEntry, CampaignRecipient, CampaignStatus, DeliveryStatus,
};
use propreach_core::{ReachError, ReachResult};
use propreach_wizard::{can_proceed, rejection_reason, CampaignDraft, STEP_ORDER};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::DispatchTrigger;
use crate::stores::{AnalyticsStore, AuditStore, CampaignStore, NewCampaign, RecipientStore};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// How the dispatch leg of a submission ended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum DispatchStatus {
    /// Dispatcher accepted the campaign. `sent` is its own count, when
    /// it reported one.
    Sent { sent: Option<u64>, total: u64 },
    /// Dispatcher call failed; the campaign and its recipients stand.
    Failed { message: String },
    /// Left for the scheduler, no dispatch attempted.
    Scheduled { total: u64 },
    /// Send-now with nothing to send.
    Skipped,
}

/// Outcome of a submission that got past campaign creation.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub campaign_id: Uuid,
    pub recipients_created: u64,
    pub batches: usize,
    pub dispatch: DispatchStatus,
    pub message: String,
}

/// Orchestrates the staged writes behind a submit action. Store seams
/// are trait objects so the pipeline itself stays storage-agnostic.
pub struct LaunchPipeline {
    campaigns: Arc<dyn CampaignStore>,
    recipients: Arc<dyn RecipientStore>,
    analytics: Arc<dyn AnalyticsStore>,
    audit: Arc<dyn AuditStore>,
    resolver: AudienceResolver,
    dispatcher: Arc<dyn DispatchTrigger>,
    notifier: Arc<dyn Notifier>,
    batch_size: usize,
}

impl LaunchPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        recipients: Arc<dyn RecipientStore>,
        analytics: Arc<dyn AnalyticsStore>,
        audit: Arc<dyn AuditStore>,
        resolver: AudienceResolver,
        dispatcher: Arc<dyn DispatchTrigger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            campaigns,
            recipients,
            analytics,
            audit,
            resolver,
            dispatcher,
            notifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Submits a finished draft.
    ///
    /// Every step gate is re-checked first, so a draft that could not
    /// have reached the review step is rejected before any write. After
    /// the campaign record exists, a failed recipient batch demotes it
    /// back to draft status; snapshot and audit writes are best-effort;
    /// a failed dispatch leaves the created campaign standing.
    pub async fn submit(
        &self,
        tenant_id: Uuid,
        actor: &str,
        draft: &CampaignDraft,
    ) -> ReachResult<LaunchReport> {
        for step in STEP_ORDER {
            if !can_proceed(step, draft) {
                return Err(ReachError::Validation(rejection_reason(step).to_string()));
            }
        }

        let campaign_id = self.create_record(tenant_id, draft).await?;
        metrics::counter!("launch.campaigns.created").increment(1);

        let resolved = match self.resolver.resolve(tenant_id, draft).await {
            Ok(resolved) => resolved,
            Err(e) => {
                // The record exists but has no recipients; park it back
                // in draft rather than leave a phantom scheduled campaign.
                self.demote_to_draft(campaign_id).await;
                return Err(e);
            }
        };

        let batches = self.insert_batches(campaign_id, &resolved).await?;

        let snapshot = AnalyticsSnapshot {
            id: Uuid::new_v4(),
            campaign_id,
            total_recipients: draft.audience_count(),
            queued_recipients: resolved.len() as u64,
            captured_at: Utc::now(),
        };
        if let Err(e) = self.analytics.record_snapshot(snapshot).await {
            warn!(campaign_id = %campaign_id, error = %e, "analytics snapshot write failed");
        }

        let entry = AuditEntry {
            id: Uuid::new_v4(),
            tenant_id,
            actor: actor.to_string(),
            action: AuditAction::Create,
            resource_type: "campaign".to_string(),
            resource_id: campaign_id.to_string(),
            details: serde_json::json!({
                "audience_method": draft.audience_method,
                "recipients": resolved.len(),
                "scheduled": !draft.send_now,
            }),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.audit.append(entry).await {
            warn!(campaign_id = %campaign_id, error = %e, "audit log write failed");
        }

        let total = resolved.len() as u64;
        let (dispatch, message) = if draft.send_now && total > 0 {
            match self.dispatcher.start(campaign_id).await {
                Ok(receipt) => {
                    let message = match receipt.sent {
                        Some(sent) => format!("Campaign sent to {sent}/{total} recipients"),
                        None => format!("Campaign sent to {total} recipients"),
                    };
                    self.notifier.notify(NoticeKind::Success, &message);
                    (
                        DispatchStatus::Sent {
                            sent: receipt.sent,
                            total,
                        },
                        message,
                    )
                }
                Err(e) => {
                    metrics::counter!("launch.dispatch_failures").increment(1);
                    warn!(campaign_id = %campaign_id, error = %e, "dispatch trigger failed");
                    let message = String::from(
                        "Campaign created, but sending could not be started. Retry dispatch manually.",
                    );
                    self.notifier.notify(NoticeKind::Warning, &message);
                    (
                        DispatchStatus::Failed {
                            message: e.to_string(),
                        },
                        message,
                    )
                }
            }
        } else if !draft.send_now {
            let message = format!("Campaign scheduled for {total} recipients");
            self.notifier.notify(NoticeKind::Success, &message);
            (DispatchStatus::Scheduled { total }, message)
        } else {
            let message = String::from("Campaign created");
            self.notifier.notify(NoticeKind::Success, &message);
            (DispatchStatus::Skipped, message)
        };

        info!(
            campaign_id = %campaign_id,
            recipients = total,
            batches,
            "campaign submitted"
        );

        Ok(LaunchReport {
            campaign_id,
            recipients_created: total,
            batches,
            dispatch,
            message,
        })
    }

    async fn create_record(&self, tenant_id: Uuid, draft: &CampaignDraft) -> ReachResult<Uuid> {
        // The step gates have already run, so these are present.
        let (Some(channel), Some(kind), Some(connection_id)) =
            (draft.channel(), draft.kind, draft.connection_id)
        else {
            return Err(ReachError::Validation(
                "Complete this step before continuing.".to_string(),
            ));
        };

        let status = if draft.send_now {
            CampaignStatus::Sending
        } else {
            CampaignStatus::Scheduled
        };
        let timezone = draft
            .timezone
            .clone()
            .unwrap_or_else(|| Local::now().offset().to_string());

        self.campaigns
            .create_campaign(NewCampaign {
                tenant_id,
                channel,
                kind,
                connection_id,
                template_id: draft.template_id(),
                custom_content: draft.custom_content().map(str::to_string),
                status,
                send_now: draft.send_now,
                scheduled_at: draft.scheduled_at,
                timezone,
                audience_method: draft.audience_method,
                total_recipients: draft.audience_count(),
            })
            .await
    }

    /// Inserts recipients in fixed-size batches, strictly in order.
    /// Returns the number of batches issued.
    async fn insert_batches(
        &self,
        campaign_id: Uuid,
        resolved: &[ResolvedRecipient],
    ) -> ReachResult<usize> {
        if resolved.is_empty() {
            return Ok(0);
        }
        let total = resolved.len().div_ceil(self.batch_size);
        for (i, chunk) in resolved.chunks(self.batch_size).enumerate() {
            let rows: Vec<CampaignRecipient> = chunk
                .iter()
                .map(|r| recipient_row(campaign_id, r))
                .collect();
            if let Err(e) = self.recipients.insert_batch(&rows).await {
                metrics::counter!("launch.batch_failures").increment(1);
                let index = i + 1;
                // Earlier batches stay committed; only the status reverts.
                self.demote_to_draft(campaign_id).await;
                self.notifier.notify(
                    NoticeKind::Error,
                    &format!(
                        "Recipient batch {index} of {total} failed; the campaign was reverted to draft."
                    ),
                );
                return Err(ReachError::Batch {
                    index,
                    total,
                    message: e.to_string(),
                });
            }
            metrics::counter!("launch.recipients.inserted").increment(rows.len() as u64);
        }
        Ok(total)
    }

    /// Best-effort demotion. Its own failure must not mask the error
    /// that caused it.
    async fn demote_to_draft(&self, campaign_id: Uuid) {
        if let Err(e) = self
            .campaigns
            .update_status(campaign_id, CampaignStatus::Draft)
            .await
        {
            warn!(campaign_id = %campaign_id, error = %e, "failed to demote campaign to draft");
        }
    }
}

fn recipient_row(campaign_id: Uuid, resolved: &ResolvedRecipient) -> CampaignRecipient {
    CampaignRecipient {
        id: Uuid::new_v4(),
        campaign_id,
        phone: resolved.phone.clone(),
        name: resolved.name.clone(),
        lead_id: resolved.lead_id,
        imported_from: resolved.imported_from,
        delivery_status: DeliveryStatus::Queued,
        created_at: Utc::now(),
    }
}
