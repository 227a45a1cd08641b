//! Dispatch trigger — the call that asks the downstream message
//! dispatcher to start sending a campaign. The trigger owns nothing past
//! that: delivery status transitions stay with the dispatcher.

use async_trait::async_trait;
use propreach_core::{ReachError, ReachResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// What the dispatcher reported back. A missing `sent` count means
/// "assume everything was handed off" for messaging purposes only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub sent: Option<u64>,
}

#[async_trait]
pub trait DispatchTrigger: Send + Sync {
    async fn start(&self, campaign_id: Uuid) -> ReachResult<DispatchReceipt>;
}

/// Invokes the dispatcher over HTTP with the start action.
pub struct HttpDispatchTrigger {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDispatchTrigger {
    pub fn new(endpoint: &str, timeout_ms: u64) -> ReachResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ReachError::Config(format!("dispatch client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl DispatchTrigger for HttpDispatchTrigger {
    async fn start(&self, campaign_id: Uuid) -> ReachResult<DispatchReceipt> {
        let payload = serde_json::json!({
            "action": "start",
            "campaign_id": campaign_id,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ReachError::Dispatch(format!("trigger request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ReachError::Dispatch(format!(
                "trigger returned status {}",
                response.status()
            )));
        }

        // The response body is the dispatcher's to shape; only an
        // optional numeric `sent` field is read from it.
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or_default();
        let sent = body.get("sent").and_then(|v| v.as_u64());
        Ok(DispatchReceipt { sent })
    }
}

/// Development stand-in that pretends the dispatcher accepted the
/// campaign without calling anything.
pub struct LocalDispatchTrigger;

#[async_trait]
impl DispatchTrigger for LocalDispatchTrigger {
    async fn start(&self, campaign_id: Uuid) -> ReachResult<DispatchReceipt> {
        info!(campaign_id = %campaign_id, "Local dispatch trigger invoked");
        Ok(DispatchReceipt { sent: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_trigger_reports_no_sent_count() {
        let trigger = LocalDispatchTrigger;
        let receipt = trigger.start(Uuid::new_v4()).await.unwrap();
        assert_eq!(receipt.sent, None);
    }
}
