//! Fan-in join of the extracted record kinds
//!
//! Builds the Session → Scene → Event tree by hash-joining on the foreign
//! keys. Runs single-threaded: the join is cheap next to extraction I/O.
//!
//! A scene or event whose parent is missing from the batch is an orphan,
//! not an error. It is skipped with a warning and stays in the store
//! untouched, so the next run re-extracts it together with its parent.

use crate::model::{EventRecord, SceneRecord, SessionRecord};
use std::collections::HashMap;
use tracing::warn;

/// Counters from one combine pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineStats {
    /// Sessions in the joined output
    pub sessions: usize,
    /// Scenes attached to a session
    pub scenes_joined: usize,
    /// Events attached to a scene
    pub events_joined: usize,
    /// Scenes dropped because their session is not in the batch
    pub orphan_scenes: usize,
    /// Events dropped because their scene is not in the batch
    pub orphan_events: usize,
}

/// Joined session trees plus join counters
#[derive(Debug, Clone)]
pub struct CombineOutput {
    /// Fully populated sessions, in extraction iteration order
    pub sessions: Vec<SessionRecord>,
    /// Join counters
    pub stats: CombineStats,
}

/// Join scenes into sessions and events into scenes
pub fn combine(
    mut sessions: Vec<SessionRecord>,
    scenes: Vec<SceneRecord>,
    events: Vec<EventRecord>,
) -> CombineOutput {
    let mut stats = CombineStats {
        sessions: sessions.len(),
        ..CombineStats::default()
    };

    let session_index: HashMap<String, usize> = sessions
        .iter()
        .enumerate()
        .map(|(index, session)| (session.id.clone(), index))
        .collect();

    // Scene id -> (session index, scene position) for the event join below.
    let mut scene_index: HashMap<String, (usize, usize)> = HashMap::new();

    for scene in scenes {
        match session_index.get(&scene.session_id) {
            Some(&at) => {
                scene_index.insert(scene.id.clone(), (at, sessions[at].scenes.len()));
                sessions[at].scenes.push(scene);
                stats.scenes_joined += 1;
            }
            None => {
                warn!(
                    "Dropping orphan scene {} (session {} not in batch), will retry next run",
                    scene.id, scene.session_id
                );
                stats.orphan_scenes += 1;
            }
        }
    }

    for event in events {
        match scene_index.get(&event.scene_id) {
            Some(&(session_at, scene_at)) => {
                sessions[session_at].scenes[scene_at].events.push(event);
                stats.events_joined += 1;
            }
            None => {
                warn!(
                    "Dropping orphan event {} (scene {} not in batch), will retry next run",
                    event.id, event.scene_id
                );
                stats.orphan_events += 1;
            }
        }
    }

    CombineOutput { sessions, stats }
}

#[cfg(test)]
mod tests;
