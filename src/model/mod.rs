//! Telemetry record model
//!
//! The three record kinds of the telemetry hierarchy as they live in the
//! online store. The nested `scenes` / `events` collections are never
//! persisted upstream; only the combiner populates them.
//!
//! Wire payloads use camelCase field names, matching what the game backend
//! writes.

use crate::error::{Error, Result};
use crate::types::{JsonValue, RecordKind};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A recorded play session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Source-store key
    pub id: String,

    /// When the session started
    pub start_time: DateTime<Utc>,

    /// When the session ended. Open sessions have no end time and are
    /// never exported.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Anonymous analytics identity of the player
    #[serde(default)]
    pub user_analytics_id: String,

    /// Platform the session ran on
    #[serde(default)]
    pub platform: String,

    /// Operating system string
    #[serde(default)]
    pub os: String,

    /// Screen size, e.g. "1920x1080"
    #[serde(default)]
    pub screen_size: String,

    /// Scenes visited during the session, populated by the combiner only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<SceneRecord>,
}

impl SessionRecord {
    /// Whether the session has ended and is eligible for export
    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// Session length in seconds, `None` while the session is open
    pub fn length_seconds(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 1000.0)
    }
}

/// A scene visited during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    /// Source-store key
    pub id: String,

    /// Key of the owning session
    pub session_id: String,

    /// When the scene started (after loading finished)
    pub start_time: DateTime<Utc>,

    /// When the scene ended
    pub end_time: DateTime<Utc>,

    /// Scene name
    pub name: String,

    /// Seconds spent loading before the scene started
    #[serde(default)]
    pub load_time: f64,

    /// True if the player abandoned the scene instead of completing it
    #[serde(default)]
    pub dropout: bool,

    /// Events recorded inside the scene, populated by the combiner only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,
}

impl SceneRecord {
    /// Scene length in seconds
    pub fn length_seconds(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// An instrumented event inside a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Source-store key
    pub id: String,

    /// Key of the owning scene
    pub scene_id: String,

    /// When the event fired
    pub time: DateTime<Utc>,

    /// Event name
    pub name: String,

    /// Free-form payload
    #[serde(default)]
    pub data: JsonValue,

    /// Categorical event code
    #[serde(rename = "type", default)]
    pub event_type: String,
}

/// Decode a raw store payload into a typed record
pub fn decode_record<T: DeserializeOwned>(kind: RecordKind, value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::decode(kind.as_str(), e.to_string()))
}

#[cfg(test)]
mod tests;
