//! Stage orchestration for one export run
//!
//! The stage graph per run:
//!
//! ```text
//! extract(session) ─┐
//! extract(scene)  ──┼─► combine ─► write ─► load ─► cleanup
//! extract(event)  ──┘
//! ```
//!
//! The three extractions run concurrently; every later stage starts only
//! after its upstream completed successfully and consumes the upstream
//! output by value. Any stage error propagates out before cleanup runs,
//! so a failed run never deletes anything — the unexported backlog is
//! simply picked up again by the next run.
//!
//! Cleanup is the single destructive stage and the last node in the graph.
//! It deletes exactly the keys of the joined batch that was written and
//! loaded, never keys of orphans that were dropped during the join.

use crate::combine::combine;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::extract::Extractor;
use crate::handoff::HandoffWriter;
use crate::model::SessionRecord;
use crate::store::{HttpStore, TelemetryStore};
use crate::types::RecordKind;
use crate::warehouse::{session_table_schema, HttpWarehouse, Warehouse};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one export run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Ended sessions extracted from the store
    pub sessions_extracted: usize,
    /// Scenes extracted from the store
    pub scenes_extracted: usize,
    /// Events extracted from the store
    pub events_extracted: usize,
    /// Sessions written to the handoff object
    pub sessions_exported: usize,
    /// Scenes dropped by the join (parent missing from batch)
    pub orphan_scenes: usize,
    /// Events dropped by the join (parent missing from batch)
    pub orphan_events: usize,
    /// URI of the handoff object, when the writer ran
    pub object_uri: Option<String>,
    /// Accepted warehouse load job id, when the loader ran
    pub load_job_id: Option<String>,
    /// Keys deleted from the online store by cleanup
    pub keys_deleted: usize,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// One-shot export pipeline over injected service handles
pub struct ExportPipeline {
    store: Arc<dyn TelemetryStore>,
    writer: HandoffWriter,
    warehouse: Arc<dyn Warehouse>,
    shard_count: usize,
}

impl ExportPipeline {
    /// Create a pipeline from explicit service handles
    pub fn new(
        store: Arc<dyn TelemetryStore>,
        writer: HandoffWriter,
        warehouse: Arc<dyn Warehouse>,
        shard_count: usize,
    ) -> Self {
        Self {
            store,
            writer,
            warehouse,
            shard_count: shard_count.max(1),
        }
    }

    /// Create a pipeline with HTTP store and warehouse clients from config
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpStore::new(&config.store)),
            HandoffWriter::new(&config.handoff)?,
            Arc::new(HttpWarehouse::new(&config.warehouse)),
            config.pipeline.shard_count,
        ))
    }

    /// Execute the stage graph once over the current unexported backlog
    pub async fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        info!("Starting analytics export run");

        // Fan-out: the three kinds have no ordering dependency at
        // extraction time.
        let extractor = Extractor::new(Arc::clone(&self.store), self.shard_count);
        let (sessions, scenes, events) = tokio::try_join!(
            extractor.extract_sessions(),
            extractor.extract_scenes(),
            extractor.extract_events(),
        )?;

        let mut report = RunReport {
            sessions_extracted: sessions.len(),
            scenes_extracted: scenes.len(),
            events_extracted: events.len(),
            ..RunReport::default()
        };
        info!(
            "Extracted {} sessions, {} scenes, {} events",
            report.sessions_extracted, report.scenes_extracted, report.events_extracted
        );

        let joined = combine(sessions, scenes, events);
        report.sessions_exported = joined.stats.sessions;
        report.orphan_scenes = joined.stats.orphan_scenes;
        report.orphan_events = joined.stats.orphan_events;
        if joined.stats.orphan_scenes > 0 || joined.stats.orphan_events > 0 {
            warn!(
                "Join dropped {} orphan scenes and {} orphan events, they stay pending",
                joined.stats.orphan_scenes, joined.stats.orphan_events
            );
        }

        if joined.sessions.is_empty() {
            info!("Nothing to export, skipping handoff, load, and cleanup");
            report.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(report);
        }

        let object_ref = self.writer.write(&joined.sessions).await?;
        report.object_uri = Some(object_ref.uri.clone());

        let job = self
            .warehouse
            .submit_load(&object_ref, session_table_schema())
            .await?;
        report.load_job_id = Some(job.id.clone());

        // Gate: the load is accepted, only now is deleting the batch safe.
        report.keys_deleted = self.cleanup(&joined.sessions).await?;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Export run complete: {} sessions exported, {} keys deleted, load job {} ({} ms)",
            report.sessions_exported, report.keys_deleted, job.id, report.duration_ms
        );
        Ok(report)
    }

    /// Delete exactly the keys of the joined batch, children first
    ///
    /// Children go first so that a crash mid-cleanup leaves re-exportable
    /// parents behind rather than permanently unjoinable orphans.
    async fn cleanup(&self, sessions: &[SessionRecord]) -> Result<usize> {
        let mut session_keys = Vec::with_capacity(sessions.len());
        let mut scene_keys = Vec::new();
        let mut event_keys = Vec::new();

        for session in sessions {
            session_keys.push(session.id.clone());
            for scene in &session.scenes {
                scene_keys.push(scene.id.clone());
                for event in &scene.events {
                    event_keys.push(event.id.clone());
                }
            }
        }
        let total = session_keys.len() + scene_keys.len() + event_keys.len();

        self.store.delete(RecordKind::Event, &event_keys).await?;
        self.store.delete(RecordKind::Scene, &scene_keys).await?;
        self.store.delete(RecordKind::Session, &session_keys).await?;

        info!(
            "Cleanup deleted {} keys ({} sessions, {} scenes, {} events)",
            total,
            session_keys.len(),
            scene_keys.len(),
            event_keys.len()
        );
        Ok(total)
    }
}
