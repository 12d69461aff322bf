//! Error types for sessionlift
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for sessionlift
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Online Store Errors
    // ============================================================================
    #[error("Store scan failed for {kind}: {message}")]
    StoreScan { kind: String, message: String },

    #[error("Store delete failed for {kind}: {message}")]
    StoreDelete { kind: String, message: String },

    #[error("Failed to decode {kind} record: {message}")]
    Decode { kind: String, message: String },

    // ============================================================================
    // Handoff / Object Storage Errors
    // ============================================================================
    #[error("Handoff write failed: {message}")]
    Handoff { message: String },

    // ============================================================================
    // Warehouse Errors
    // ============================================================================
    #[error("Warehouse load failed: {message}")]
    Warehouse { message: String },

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a store scan error
    pub fn store_scan(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreScan {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a store delete error
    pub fn store_delete(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreDelete {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a handoff error
    pub fn handoff(message: impl Into<String>) -> Self {
        Self::Handoff {
            message: message.into(),
        }
    }

    /// Create a warehouse error
    pub fn warehouse(message: impl Into<String>) -> Self {
        Self::Warehouse {
            message: message.into(),
        }
    }

    /// Create a stage error
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for sessionlift
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
