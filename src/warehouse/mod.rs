//! Analytical warehouse bulk loading
//!
//! The pipeline consumes the warehouse through the [`Warehouse`] trait.
//! Submitting a load is asynchronous on the warehouse side: the stage's
//! success criterion is that the load was *accepted*, not that it finished.
//! Cleanup is gated on acceptance; the remaining risk window is covered by
//! at-least-once semantics, since duplicate rows are tolerated downstream.

mod http;
mod schema;

pub use http::HttpWarehouse;
pub use schema::{session_table_schema, FieldMode, FieldType, TableField, TableSchema};

use crate::error::Result;
use crate::handoff::ObjectRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reference to an accepted bulk-load job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadJob {
    /// Warehouse-assigned job id
    pub id: String,
    /// Dataset the load targets
    pub dataset: String,
    /// Table the load targets
    pub table: String,
}

/// State of a bulk-load job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Accepted, not yet started
    Pending,
    /// Load in progress
    Running,
    /// Load finished successfully
    Done,
    /// Load failed; the source data was not deleted and the next run
    /// re-exports it
    Failed,
}

/// Bulk-load access to the analytical warehouse
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Submit an asynchronous bulk load of `source` into the configured
    /// table, described by `schema`. Returns once the warehouse accepted
    /// the job.
    async fn submit_load(&self, source: &ObjectRef, schema: &TableSchema) -> Result<LoadJob>;

    /// Look up the state of a previously accepted load job
    async fn load_state(&self, job: &LoadJob) -> Result<LoadState>;
}
