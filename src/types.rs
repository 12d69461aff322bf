//! Common types used throughout sessionlift
//!
//! Shared type definitions and aliases used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Record Kind
// ============================================================================

/// The three levels of the telemetry hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Top-level play session
    Session,
    /// Scene visited during a session
    Scene,
    /// Instrumented event inside a scene
    Event,
}

impl RecordKind {
    /// All kinds, in hierarchy order
    pub const ALL: [RecordKind; 3] = [RecordKind::Session, RecordKind::Scene, RecordKind::Event];

    /// Stable name used in store URLs and log messages
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Session => "session",
            RecordKind::Scene => "scene",
            RecordKind::Event => "event",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for HTTP retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
