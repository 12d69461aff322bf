//! CLI module
//!
//! Command-line interface for the export pipeline.
//!
//! # Commands
//!
//! - `run` - Execute one export pass over the current backlog
//! - `validate` - Check the configuration file
//! - `serve` - Start HTTP server mode with the export trigger endpoint

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{build_router, serve, RunStatus};
