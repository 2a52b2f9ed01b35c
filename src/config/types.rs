use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Discovery backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend (e.g., "https://api.example.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the candidate-discovery endpoint.
    #[serde(default = "default_candidates_path")]
    pub candidates_path: String,
    /// Path of the swipe-recording endpoint.
    #[serde(default = "default_swipes_path")]
    pub swipes_path: String,
    /// Authentication type: "bearer", "api_key", "none".
    #[serde(rename = "auth_type", default = "default_auth_type")]
    pub auth_type_str: String,
    /// Caller-identity token sent with every request.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Feed pagination and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Candidates requested per page (default: 20).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Remaining-candidate count at or below which a prefetch starts (default: 5).
    #[serde(default = "default_low_water_mark")]
    pub low_water_mark: usize,
    /// Quiet period before text filter edits trigger a refetch (default: 500).
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Delay between a confirmed swipe and removal from the feed (default: 0).
    #[serde(default)]
    pub swipe_exit_delay_ms: u64,
}

/// Local persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File holding persisted preferences. Defaults to the platform data dir.
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_candidates_path() -> String {
    "/api/profiles".to_string()
}

fn default_swipes_path() -> String {
    "/api/swipes".to_string()
}

fn default_auth_type() -> String {
    "bearer".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_page_size() -> usize {
    20
}

fn default_low_water_mark() -> usize {
    5
}

fn default_search_debounce_ms() -> u64 {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            candidates_path: default_candidates_path(),
            swipes_path: default_swipes_path(),
            auth_type_str: default_auth_type(),
            auth_token: None,
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            low_water_mark: default_low_water_mark(),
            search_debounce_ms: default_search_debounce_ms(),
            swipe_exit_delay_ms: 0,
        }
    }
}

impl StorageConfig {
    /// Resolve the preferences file, falling back to
    /// `<data_dir>/matchfeed/preferences.json`.
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("matchfeed")
                .join("preferences.json")
        })
    }
}
