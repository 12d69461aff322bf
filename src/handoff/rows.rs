//! Export row shapes
//!
//! The denormalized form a joined session takes in the handoff file and in
//! the warehouse table. Identifiers are store-internal and do not travel;
//! durations are flattened to seconds.

use crate::model::{EventRecord, SceneRecord, SessionRecord};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One NDJSON line: a session with its full subtree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub start_time: DateTime<Utc>,
    /// Session length in seconds
    pub length: f64,
    pub user_analytics_id: String,
    pub platform: String,
    pub os: String,
    pub screen_size: String,
    pub scenes: Vec<SceneRow>,
}

/// A scene inside a session row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRow {
    pub start_time: DateTime<Utc>,
    /// Scene length in seconds
    pub length: f64,
    pub name: String,
    /// Seconds spent loading before the scene started
    pub load_time: f64,
    pub dropout: bool,
    pub events: Vec<EventRow>,
}

/// An event inside a scene row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub time: DateTime<Utc>,
    pub name: String,
    pub data: JsonValue,
    #[serde(rename = "type")]
    pub event_type: String,
}

impl From<&SessionRecord> for SessionRow {
    fn from(session: &SessionRecord) -> Self {
        Self {
            start_time: session.start_time,
            // Only ended sessions reach the writer; 0.0 would mean the
            // eligibility filter upstream is broken.
            length: session.length_seconds().unwrap_or_default(),
            user_analytics_id: session.user_analytics_id.clone(),
            platform: session.platform.clone(),
            os: session.os.clone(),
            screen_size: session.screen_size.clone(),
            scenes: session.scenes.iter().map(SceneRow::from).collect(),
        }
    }
}

impl From<&SceneRecord> for SceneRow {
    fn from(scene: &SceneRecord) -> Self {
        Self {
            start_time: scene.start_time,
            length: scene.length_seconds(),
            name: scene.name.clone(),
            load_time: scene.load_time,
            dropout: scene.dropout,
            events: scene.events.iter().map(EventRow::from).collect(),
        }
    }
}

impl From<&EventRecord> for EventRow {
    fn from(event: &EventRecord) -> Self {
        Self {
            time: event.time,
            name: event.name.clone(),
            data: event.data.clone(),
            event_type: event.event_type.clone(),
        }
    }
}
