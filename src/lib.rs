//! # sessionlift
//!
//! A batch export pipeline that moves hierarchical game telemetry
//! (session → scene → event) from a low-latency online store into a
//! denormalized analytical warehouse, deleting source records only after
//! they are durably present downstream.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        ExportPipeline::run()                     │
//! │ extract(session) ∥ extract(scene) ∥ extract(event)               │
//! │        └──────────── combine ─► write ─► load ─► cleanup         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each run is a one-shot execution of the stage graph: the three kind
//! extractions fan out over shard workers and run concurrently; the
//! combiner joins the batch into session trees; the writer lands the batch
//! as newline-delimited JSON in object storage; the loader submits a
//! warehouse bulk load referencing that object; cleanup deletes exactly
//! the joined batch's keys - and only once the load was accepted.
//!
//! Delivery is at-least-once: a run that fails at any stage deletes
//! nothing, and the still-unexported backlog is picked up by the next run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sessionlift::config::ExportConfig;
//! use sessionlift::pipeline::ExportPipeline;
//!
//! #[tokio::main]
//! async fn main() -> sessionlift::Result<()> {
//!     let config = ExportConfig::from_yaml_file("sessionlift.yaml")?;
//!     let pipeline = ExportPipeline::from_config(&config)?;
//!     let report = pipeline.run().await?;
//!     println!("exported {} sessions", report.sessions_exported);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pipeline configuration
pub mod config;

/// Telemetry record model
pub mod model;

/// HTTP client with retry and rate limiting
pub mod http;

/// Online telemetry store access
pub mod store;

/// Sharded extraction
pub mod extract;

/// Fan-in join of the record hierarchy
pub mod combine;

/// Durable handoff to object storage
pub mod handoff;

/// Warehouse bulk loading
pub mod warehouse;

/// Stage orchestration
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::ExportConfig;
pub use pipeline::{ExportPipeline, RunReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
