//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sessionlift - telemetry export pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "sessionlift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, global = true, default_value = "sessionlift.yaml")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute one export pass over the current unexported backlog
    Run,

    /// Validate the configuration file
    Validate,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}
