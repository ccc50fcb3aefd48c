//! Gateway configuration.
//!
//! Loaded from an optional file named by `POSTVIEWS_CONFIG` and overlaid with
//! `POSTVIEWS_*` environment variables (`__` separates nested keys):
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `POSTVIEWS_PORT` | `3000` | TCP port to listen on. |
//! | `POSTVIEWS_STORE` | `sanity` | `sanity` or `memory`. |
//! | `POSTVIEWS_SANITY__PROJECT_ID` | *(none)* | Sanity project id. |
//! | `POSTVIEWS_SANITY__DATASET` | `production` | Dataset name. |
//! | `POSTVIEWS_SANITY__API_VERSION` | `2024-01-01` | Dated API version. |
//! | `POSTVIEWS_SANITY__WRITE_TOKEN` | *(none)* | Token with write access. |
//! | `POSTVIEWS_SANITY__USE_CDN_FOR_READS` | `false` | Serve listings from the CDN. |
//! | `POSTVIEWS_RATE_LIMIT__WINDOW_SECS` | `1800` | Rate-limit bucket width. |
//! | `POSTVIEWS_RATE_LIMIT__MAX_REQUESTS` | `10` | Increments per IP per bucket. |
//! | `POSTVIEWS_RATE_LIMIT__CLEANUP_THRESHOLD` | `1000` | Map size that triggers a sweep. |
//! | `POSTVIEWS_LOOKUP_TIMEOUT_MS` | `5000` | Counter lookup deadline. |
//! | `POSTVIEWS_VIEW_CEILING` | `1000000` | Absolute counter ceiling. |
//! | `POSTVIEWS_ENABLE_DEBUG_ROUTES` | `false` | Expose `POST /api/debug-views`. |

use postviews_kernel::config::{ConfigError, ConfigResult, load_layered};
use postviews_kernel::limits::{
    MAX_REQUESTS_PER_IP, RATE_LIMIT_CLEANUP_THRESHOLD, RATE_LIMIT_WINDOW, STORE_LOOKUP_TIMEOUT,
    VIEW_CEILING,
};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const ENV_PREFIX: &str = "POSTVIEWS";
pub const CONFIG_PATH_VAR: &str = "POSTVIEWS_CONFIG";

/// Which [`ContentStore`](postviews_kernel::ContentStore) backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Sanity,
    Memory,
}

/// Connection settings for the Sanity project.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Mutation credential. Never logged.
    pub write_token: Option<String>,
    pub use_cdn_for_reads: bool,
    pub request_timeout_secs: u64,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            write_token: None,
            use_cdn_for_reads: false,
            request_timeout_secs: 15,
        }
    }
}

impl fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("write_token", &self.write_token.as_ref().map(|_| "<redacted>"))
            .field("use_cdn_for_reads", &self.use_cdn_for_reads)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Per-IP fixed-bucket limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: u32,
    pub cleanup_threshold: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: RATE_LIMIT_WINDOW.as_secs(),
            max_requests: MAX_REQUESTS_PER_IP,
            cleanup_threshold: RATE_LIMIT_CLEANUP_THRESHOLD,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Runtime configuration for [`GatewayServer`](crate::server::GatewayServer).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    pub store: StoreKind,
    pub sanity: SanityConfig,
    /// Post ids preloaded into the memory store (`store = "memory"` only).
    pub memory_seed: Vec<String>,
    pub rate_limit: RateLimitSettings,
    pub lookup_timeout_ms: u64,
    pub view_ceiling: u64,
    pub enable_debug_routes: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            store: StoreKind::default(),
            sanity: SanityConfig::default(),
            memory_seed: Vec::new(),
            rate_limit: RateLimitSettings::default(),
            lookup_timeout_ms: u64::try_from(STORE_LOOKUP_TIMEOUT.as_millis()).unwrap_or(5_000),
            view_ceiling: VIEW_CEILING,
            enable_debug_routes: false,
        }
    }
}

impl GatewayConfig {
    /// Load from `POSTVIEWS_CONFIG` (if set) and the environment, then
    /// validate.
    pub fn load() -> ConfigResult<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).ok();
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&str>) -> ConfigResult<Self> {
        let config: Self = load_layered(path, ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Reject settings that would make every request fail or every client
    /// share nothing.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_secs must be greater than 0".into(),
            ));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests must be greater than 0".into(),
            ));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "lookup_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.view_ceiling == 0 {
            return Err(ConfigError::Invalid(
                "view_ceiling must be greater than 0".into(),
            ));
        }
        if self.store == StoreKind::Sanity {
            if self.sanity.project_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "sanity.project_id is required when store = \"sanity\"".into(),
                ));
            }
            if self.sanity.request_timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "sanity.request_timeout_secs must be greater than 0".into(),
                ));
            }
        }
        Ok(())
    }
}
