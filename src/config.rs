use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{error, info};

// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins
    pub cors_origins: Option<String>,

    /// JWT secret key for handshake authentication
    pub auth_jwt_secret: Option<String>,

    /// Database URL. When absent the server runs on the in-memory store.
    pub db_url: Option<String>,

    /// Interval between heartbeat pings to connected clients
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// A connection with no inbound traffic for this long is considered
    /// half-open and gets closed by the heartbeat task.
    #[serde(default = "default_client_timeout_secs")]
    pub client_timeout_secs: u64,

    /// Interval between sweeps of expired documents
    #[serde(default = "default_expiry_sweep_interval_secs")]
    pub expiry_sweep_interval_secs: u64,

    /// When true, an edit is only broadcast after its persistence write
    /// succeeded. When false, the broadcast is issued immediately and the
    /// write runs concurrently (the original fire-and-forget ordering).
    #[serde(default = "default_broadcast_after_persist")]
    pub broadcast_after_persist: bool,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::Env(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            auth_jwt_secret: None,
            db_url: None,
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            client_timeout_secs: default_client_timeout_secs(),
            expiry_sweep_interval_secs: default_expiry_sweep_interval_secs(),
            broadcast_after_persist: default_broadcast_after_persist(),
        }
    }
}

/// Install the global configuration. Later calls are ignored.
pub fn init_config(config: Config) {
    let _ = CONFIG.set(config);
}

/// Get the global configuration, falling back to defaults if `init_config`
/// was never called (e.g. in tests).
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    Env(#[from] envy::Error),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

fn default_client_timeout_secs() -> u64 {
    75
}

fn default_expiry_sweep_interval_secs() -> u64 {
    3600
}

fn default_broadcast_after_persist() -> bool {
    true
}
