//! Configuration for the export pipeline
//!
//! All fixed identifiers (store endpoint, handoff destination and object
//! name, warehouse dataset/table) live here so deployments can change them
//! without touching code. Configuration is loaded from YAML.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Export Config
// ============================================================================

/// Complete pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Online store settings
    pub store: StoreSettings,

    /// Durable handoff (object storage) settings
    pub handoff: HandoffSettings,

    /// Analytical warehouse settings
    pub warehouse: WarehouseSettings,

    /// Pipeline execution settings
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

impl ExportConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.shard_count == 0 {
            return Err(Error::InvalidConfigValue {
                field: "pipeline.shard_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.store.page_size == 0 {
            return Err(Error::InvalidConfigValue {
                field: "store.page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        url::Url::parse(&self.store.base_url).map_err(|e| Error::InvalidConfigValue {
            field: "store.base_url".to_string(),
            message: e.to_string(),
        })?;
        url::Url::parse(&self.warehouse.base_url).map_err(|e| Error::InvalidConfigValue {
            field: "warehouse.base_url".to_string(),
            message: e.to_string(),
        })?;
        if self.handoff.destination.is_empty() {
            return Err(Error::InvalidConfigValue {
                field: "handoff.destination".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.handoff.object_name.is_empty() {
            return Err(Error::InvalidConfigValue {
                field: "handoff.object_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Store Settings
// ============================================================================

/// Online telemetry store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the store's query API
    pub base_url: String,

    /// Records fetched per scan page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// HTTP client behavior for store requests
    #[serde(default)]
    pub http: HttpSettings,

    /// Rate limiting for store requests
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

fn default_page_size() -> usize {
    500
}

// ============================================================================
// Handoff Settings
// ============================================================================

/// Durable handoff settings (object storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffSettings {
    /// Destination URL: `s3://bucket/prefix/`, `gs://bucket/prefix/`,
    /// `az://container/prefix/` or a local path
    pub destination: String,

    /// Well-known object name the batch is written under, overwritten
    /// on every run
    #[serde(default = "default_object_name")]
    pub object_name: String,
}

fn default_object_name() -> String {
    "sessions.ndjson".to_string()
}

// ============================================================================
// Warehouse Settings
// ============================================================================

/// Analytical warehouse settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSettings {
    /// Base URL of the warehouse load API
    pub base_url: String,

    /// Target dataset name
    pub dataset: String,

    /// Target table name
    pub table: String,

    /// HTTP client behavior for warehouse requests
    #[serde(default)]
    pub http: HttpSettings,
}

// ============================================================================
// Pipeline Settings
// ============================================================================

/// Pipeline execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Number of parallel shards per record kind during extraction
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
        }
    }
}

fn default_shard_count() -> usize {
    8
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings shared by store and warehouse clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffSettings,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffSettings::default(),
        }
    }
}

impl HttpSettings {
    /// Build an [`HttpClientConfig`] rooted at `base_url`
    pub fn client_config(&self, base_url: &str) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(
                self.retry_backoff.backoff_type,
                Duration::from_millis(self.retry_backoff.initial_ms),
                Duration::from_millis(self.retry_backoff.max_ms),
            )
            .build()
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffSettings {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Requests per second limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_rps")]
    pub burst_size: u32,

    /// Whether rate limiting is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_second: default_rps(),
            burst_size: default_rps(),
            enabled: default_true(),
        }
    }
}

impl RateLimitSettings {
    /// Build a [`RateLimiterConfig`], or `None` when disabled
    pub fn limiter_config(&self) -> Option<RateLimiterConfig> {
        self.enabled
            .then(|| RateLimiterConfig::new(self.requests_per_second, self.burst_size))
    }
}

fn default_rps() -> u32 {
    10
}

fn default_true() -> bool {
    true
}
