use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PROPREACH__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub crm: CrmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
            launch: LaunchConfig::default(),
            dispatch: DispatchConfig::default(),
            crm: CrmConfig::default(),
        }
    }
}

// ─── Launch Config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    /// Recipient rows written per store call during submission.
    #[serde(default = "default_recipient_batch_size")]
    pub recipient_batch_size: usize,
}

fn default_recipient_batch_size() -> usize {
    500
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            recipient_batch_size: default_recipient_batch_size(),
        }
    }
}

// ─── Dispatch Config ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Base URL of the message dispatcher. When unset the local stub
    /// dispatcher is used.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_dispatch_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_dispatch_timeout_ms() -> u64 {
    10_000
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_dispatch_timeout_ms(),
        }
    }
}

// ─── CRM Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

fn default_seed_demo_data() -> bool {
    true
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PROPREACH")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
