//! PropReach — campaign wizard and submission service for real-estate outreach.
//!
//! Main entry point that wires the CRM stores, launch pipeline, and API server.

use clap::Parser;
use propreach_api::{ApiServer, AppState, SessionStore};
use propreach_audience::AudienceResolver;
use propreach_core::config::AppConfig;
use propreach_core::notify::noop_notifier;
use propreach_crm::seed::seed_demo_data;
use propreach_crm::{ConnectionDirectory, MemoryLeadStore, TemplateCatalog};
use propreach_launch::{
    DispatchTrigger, HttpDispatchTrigger, LaunchPipeline, LocalDispatchTrigger, MemoryStore,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "propreach")]
#[command(about = "Campaign wizard and submission service for real-estate outreach")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "PROPREACH__SERVER__HTTP_PORT")]
    http_port: Option<u16>,

    /// Message dispatcher endpoint (overrides config)
    #[arg(long, env = "PROPREACH__DISPATCH__ENDPOINT")]
    dispatch_endpoint: Option<String>,

    /// Start with an empty CRM (skip the demo seed data)
    #[arg(long, default_value_t = false)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "propreach=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("PropReach starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.server.http_port = port;
    }
    if cli.dispatch_endpoint.is_some() {
        config.dispatch.endpoint = cli.dispatch_endpoint;
    }
    if cli.no_seed {
        config.crm.seed_demo_data = false;
    }

    info!(
        http_port = config.server.http_port,
        batch_size = config.launch.recipient_batch_size,
        seed_demo_data = config.crm.seed_demo_data,
        "Configuration loaded"
    );

    // Initialize CRM stores
    let leads = Arc::new(MemoryLeadStore::new());
    let connections = Arc::new(ConnectionDirectory::new());
    let templates = Arc::new(TemplateCatalog::new());

    if config.crm.seed_demo_data {
        seed_demo_data(&leads, &connections, &templates);
    }

    // Initialize campaign storage
    let store = Arc::new(MemoryStore::new());

    // Dispatch trigger: HTTP when an endpoint is configured, local stub otherwise
    let dispatcher: Arc<dyn DispatchTrigger> = match config.dispatch.endpoint.as_deref() {
        Some(endpoint) => {
            info!(endpoint, "Using HTTP dispatch trigger");
            Arc::new(HttpDispatchTrigger::new(endpoint, config.dispatch.timeout_ms)?)
        }
        None => {
            info!("No dispatch endpoint configured, using local dispatch trigger");
            Arc::new(LocalDispatchTrigger)
        }
    };

    // Assemble the launch pipeline
    let pipeline = Arc::new(
        LaunchPipeline::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            AudienceResolver::new(leads.clone()),
            dispatcher,
            noop_notifier(),
        )
        .with_batch_size(config.launch.recipient_batch_size),
    );

    let state = AppState {
        sessions: Arc::new(SessionStore::new()),
        leads: leads.clone(),
        connections,
        templates,
        campaigns: store.clone(),
        recipients: store.clone(),
        audit: store,
        pipeline,
        start_time: Instant::now(),
    };

    // Start API server
    let api_server = ApiServer::new(config, state);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("PropReach is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
