//! Online telemetry store access
//!
//! The pipeline consumes the store through the [`TelemetryStore`] trait and
//! receives a concrete handle at construction time. Two backends ship with
//! the crate: [`HttpStore`] against the store's REST query API, and
//! [`MemoryStore`] for local development and tests.
//!
//! The scan contract: the store partitions its `exported = false` result set
//! for a kind into `shard_count` disjoint shards whose union is the full
//! result set. How it partitions (key range, hash) is its own business.

mod http;
mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{JsonValue, RecordKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of a sharded scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPage {
    /// Raw record payloads
    pub records: Vec<JsonValue>,

    /// Cursor for the next page, `None` when the shard is exhausted
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A disjoint partition of a kind's unexported backlog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    /// Shard index, `0..shard_count`
    pub index: usize,
    /// Total number of shards in this scan
    pub count: usize,
}

impl Shard {
    /// Create a shard reference
    pub fn new(index: usize, count: usize) -> Self {
        Self { index, count }
    }
}

impl std::fmt::Display for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

/// Query and delete access to the online telemetry store
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Fetch one page of the `exported = false` result set for `kind`,
    /// restricted to `shard`. Pass the previous page's cursor to continue.
    async fn scan_page(
        &self,
        kind: RecordKind,
        shard: Shard,
        cursor: Option<String>,
    ) -> Result<ScanPage>;

    /// Delete the given keys of `kind`. Deleting a key that no longer
    /// exists is not an error.
    async fn delete(&self, kind: RecordKind, keys: &[String]) -> Result<()>;
}

#[cfg(test)]
mod tests;
