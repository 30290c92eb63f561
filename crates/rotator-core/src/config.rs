use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

/// Environment variable holding the upstream application client id.
pub const CLIENT_ID_ENV: &str = "TWITCH_CLIENT_ID";
/// Environment variable holding the upstream application client secret.
pub const CLIENT_SECRET_ENV: &str = "TWITCH_CLIENT_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Settings for the credential-shielding status proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// OAuth2 client-credentials endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Base of the upstream API; `/streams` is appended.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound for every upstream call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Settings for the rotating client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the proxy's status endpoint.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Seconds each channel stays on screen (clamped to 5..=600 at runtime).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_live_only")]
    pub live_only: bool,
    #[serde(default)]
    pub muted: bool,
    /// Host name handed to the player embed as its `parent`.
    #[serde(default = "default_parent_host")]
    pub parent_host: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Key-value file holding the roster and category filter.
    #[serde(default = "default_store_file")]
    pub store_file: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            token_url: default_token_url(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            interval_secs: default_interval_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            live_only: default_live_only(),
            muted: false,
            parent_host: default_parent_host(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_token_url() -> String {
    "https://id.twitch.tv/oauth2/token".to_string()
}

fn default_api_url() -> String {
    "https://api.twitch.tv/helix".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_proxy_url() -> String {
    format!("http://{}:{}/status", default_bind_address(), default_port())
}

fn default_interval_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_live_only() -> bool {
    true
}

fn default_parent_host() -> String {
    "localhost".to_string()
}

fn default_store_file() -> PathBuf {
    platform::data_dir().join("store.json")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

/// Upstream application credentials, read from the environment only so they
/// never end up in `config.toml`.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// `None` when either variable is missing or empty.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var(CLIENT_ID_ENV).ok().filter(|v| !v.is_empty())?;
        let client_secret = std::env::var(CLIENT_SECRET_ENV)
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
