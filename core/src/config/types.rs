use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub gatekeeper: GatekeeperConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub events_out: EventsOutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_score_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_score_endpoint() -> String {
    "http://localhost:8000/api/v1/score".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            endpoint: default_score_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Unset means a cached verdict is trusted for the process lifetime.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

fn default_cache_capacity() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    #[serde(default = "default_block_page_url")]
    pub block_page_url: String,

    #[serde(default = "default_internal_prefixes")]
    pub internal_prefixes: Vec<String>,

    /// Re-read the tab's location right before redirecting and skip the
    /// redirect when the user already moved on.
    #[serde(default = "default_revalidate_tab")]
    pub revalidate_tab: bool,
}

fn default_block_page_url() -> String {
    "chrome-extension://phishshield/block.html".to_string()
}

fn default_internal_prefixes() -> Vec<String> {
    ["chrome://", "about:", "chrome-extension://", "edge://"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_revalidate_tab() -> bool {
    true
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            block_page_url: default_block_page_url(),
            internal_prefixes: default_internal_prefixes(),
            revalidate_tab: default_revalidate_tab(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsOutConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub path: String,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default = "default_drop_when_full")]
    pub drop_when_full: bool,
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_drop_when_full() -> bool {
    true
}

impl Default for EventsOutConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: String::new(),
            channel_capacity: default_channel_capacity(),
            drop_when_full: default_drop_when_full(),
        }
    }
}
