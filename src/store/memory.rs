//! In-memory store backend
//!
//! Serves local development and the test suite. Records are kept in
//! key order per kind; shard assignment hashes the key so the shard
//! union always equals the full result set.

use super::{ScanPage, Shard, TelemetryStore};
use crate::error::{Error, Result};
use crate::types::{JsonValue, RecordKind};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory telemetry store
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKind, BTreeMap<String, JsonValue>>>,
    page_size: usize,
    delete_calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the default page size
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    /// Create an empty store with an explicit scan page size
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            page_size,
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Insert a raw record. The payload must carry an `"id"` field, which
    /// becomes the store key.
    pub async fn insert(&self, kind: RecordKind, record: JsonValue) -> Result<()> {
        let key = record
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::decode(kind.as_str(), "record without id"))?
            .to_string();

        self.records
            .write()
            .await
            .entry(kind)
            .or_default()
            .insert(key, record);
        Ok(())
    }

    /// Number of records currently stored for a kind
    pub async fn len(&self, kind: RecordKind) -> usize {
        self.records
            .read()
            .await
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }

    /// Whether a key is still present
    pub async fn contains(&self, kind: RecordKind, key: &str) -> bool {
        self.records
            .read()
            .await
            .get(&kind)
            .is_some_and(|m| m.contains_key(key))
    }

    /// Number of `delete` calls observed, across all kinds
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

fn shard_of(key: &str, count: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % count.max(1)
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    async fn scan_page(
        &self,
        kind: RecordKind,
        shard: Shard,
        cursor: Option<String>,
    ) -> Result<ScanPage> {
        let records = self.records.read().await;
        let Some(by_key) = records.get(&kind) else {
            return Ok(ScanPage::default());
        };

        let page: Vec<(&String, &JsonValue)> = by_key
            .iter()
            .filter(|(key, _)| shard_of(key, shard.count) == shard.index)
            .filter(|(key, _)| cursor.as_deref().is_none_or(|c| key.as_str() > c))
            .take(self.page_size)
            .collect();

        let next_cursor = (page.len() == self.page_size)
            .then(|| page.last().map(|(key, _)| (*key).clone()))
            .flatten();

        Ok(ScanPage {
            records: page.into_iter().map(|(_, value)| value.clone()).collect(),
            next_cursor,
        })
    }

    async fn delete(&self, kind: RecordKind, keys: &[String]) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        let mut records = self.records.write().await;
        if let Some(by_key) = records.get_mut(&kind) {
            for key in keys {
                by_key.remove(key);
            }
        }
        Ok(())
    }
}
