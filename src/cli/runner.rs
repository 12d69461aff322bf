//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::pipeline::ExportPipeline;
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run => self.run_once().await,
            Commands::Validate => self.validate(),
            Commands::Serve { port } => self.serve(*port).await,
        }
    }

    /// Load and validate the configuration file
    fn load_config(&self) -> Result<ExportConfig> {
        ExportConfig::from_yaml_file(&self.cli.config)
    }

    /// Execute one export pass and print the report
    async fn run_once(&self) -> Result<()> {
        let config = self.load_config()?;
        let pipeline = ExportPipeline::from_config(&config)?;

        let report = pipeline.run().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// Validate the configuration file and report the result
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        info!(
            "Configuration OK: store {}, warehouse {}.{}",
            config.store.base_url, config.warehouse.dataset, config.warehouse.table
        );
        println!("Configuration OK");
        Ok(())
    }

    /// Start HTTP server mode
    async fn serve(&self, port: u16) -> Result<()> {
        let config = self.load_config()?;
        let pipeline = Arc::new(ExportPipeline::from_config(&config)?);
        crate::cli::serve(pipeline, port).await
    }
}
