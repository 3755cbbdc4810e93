// --- File: crates/medconf_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Backend API Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash (e.g. `https://api.example.com/api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for every backend round trip made by the notification core.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// --- Deep Link Config ---
// The custom scheme and the web host are both part of the public link format,
// so they must match what the installed app and the web fallback accept.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeepLinkConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_web_host")]
    pub web_host: String,
}

impl Default for DeepLinkConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            web_host: default_web_host(),
        }
    }
}

fn default_scheme() -> String {
    "app".to_string()
}

fn default_web_host() -> String {
    "app.example.com".to_string()
}

// --- Push Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PushConfig {
    /// Delay before the "open settings" explanation is shown after a permission denial.
    #[serde(default = "default_permission_prompt_delay_ms")]
    pub permission_prompt_delay_ms: u64,
    /// Location of the durable key-value file holding the device token and session credential.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            permission_prompt_delay_ms: default_permission_prompt_delay_ms(),
            store_path: default_store_path(),
        }
    }
}

fn default_permission_prompt_delay_ms() -> u64 {
    1500
}

fn default_store_path() -> String {
    ".medconf/store.json".to_string()
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub deep_links: DeepLinkConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
