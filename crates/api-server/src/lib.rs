#![warn(clippy::unwrap_used)]

pub mod handlers;
pub mod router;
pub mod server;
pub mod session;

pub use handlers::AppState;
pub use router::api_router;
pub use server::ApiServer;
pub use session::{SessionStore, SessionView, WizardSession};
