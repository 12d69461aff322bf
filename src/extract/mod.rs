//! Sharded extraction of the unexported backlog
//!
//! For each record kind the extractor fans out one worker per shard. A
//! worker pages through its shard of the `exported = false` result set,
//! decoding raw payloads into typed records in a shard-local vector. The
//! stage blocks until every worker finished (hard fan-in barrier), then
//! concatenates shard outputs; order across shards carries no meaning.
//!
//! Any failed shard fails the kind's whole extraction. Transient store
//! errors are retried inside the HTTP client; once exhausted the error
//! surfaces here and the run aborts without deleting anything.

use crate::error::{Error, Result};
use crate::model::{decode_record, EventRecord, SceneRecord, SessionRecord};
use crate::store::{Shard, TelemetryStore};
use crate::types::RecordKind;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Parallel scan of one record kind across a fixed shard count
pub struct Extractor {
    store: Arc<dyn TelemetryStore>,
    shard_count: usize,
}

impl Extractor {
    /// Create an extractor over the given store handle
    pub fn new(store: Arc<dyn TelemetryStore>, shard_count: usize) -> Self {
        Self {
            store,
            shard_count: shard_count.max(1),
        }
    }

    /// Extract all ended, unexported sessions
    ///
    /// Open sessions are skipped: they stay pending in the store and become
    /// eligible once the game backend records their end time.
    pub async fn extract_sessions(&self) -> Result<Vec<SessionRecord>> {
        let sessions: Vec<SessionRecord> = self.extract_kind(RecordKind::Session).await?;
        let total = sessions.len();
        let ended: Vec<SessionRecord> =
            sessions.into_iter().filter(SessionRecord::is_ended).collect();

        let open = total - ended.len();
        if open > 0 {
            debug!("Skipping {open} open sessions, they stay pending for a later run");
        }
        Ok(ended)
    }

    /// Extract all unexported scenes
    pub async fn extract_scenes(&self) -> Result<Vec<SceneRecord>> {
        self.extract_kind(RecordKind::Scene).await
    }

    /// Extract all unexported events
    pub async fn extract_events(&self) -> Result<Vec<EventRecord>> {
        self.extract_kind(RecordKind::Event).await
    }

    /// Fan out shard workers for one kind and merge their outputs
    async fn extract_kind<T>(&self, kind: RecordKind) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut workers = Vec::with_capacity(self.shard_count);
        for index in 0..self.shard_count {
            let store = Arc::clone(&self.store);
            let shard = Shard::new(index, self.shard_count);
            workers.push(tokio::spawn(scan_shard::<T>(store, kind, shard)));
        }

        // Barrier: every shard worker must finish before the merge.
        let outputs = try_join_all(workers)
            .await
            .map_err(|e| Error::store_scan(kind.as_str(), format!("shard worker panicked: {e}")))?;

        let mut merged = Vec::new();
        for output in outputs {
            merged.extend(output?);
        }

        debug!("Extracted {} {kind} records across {} shards", merged.len(), self.shard_count);
        Ok(merged)
    }
}

/// Page through one shard, decoding as we go
async fn scan_shard<T: DeserializeOwned>(
    store: Arc<dyn TelemetryStore>,
    kind: RecordKind,
    shard: Shard,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    let mut cursor = None;

    loop {
        let page = store.scan_page(kind, shard, cursor).await?;
        for raw in page.records {
            records.push(decode_record(kind, raw)?);
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!("Shard {shard} finished with {} {kind} records", records.len());
    Ok(records)
}
