//! Campaign submission — the staged write sequence that turns a finished
//! wizard draft into a persisted campaign with queued recipients.
//!
//! Data stored in DashMap (development); swap to PostgreSQL for production.

pub mod dispatch;
pub mod memory;
pub mod pipeline;
pub mod stores;

pub use dispatch::{DispatchReceipt, DispatchTrigger, HttpDispatchTrigger, LocalDispatchTrigger};
pub use memory::MemoryStore;
pub use pipeline::{DispatchStatus, LaunchPipeline, LaunchReport};
pub use stores::{AnalyticsStore, AuditStore, CampaignStore, NewCampaign, RecipientStore};
