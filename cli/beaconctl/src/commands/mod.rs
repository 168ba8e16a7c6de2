//! CLI commands.

mod config;
mod track;

use std::sync::Arc;

use anyhow::Result;
use beacon_sdk::{
    BeaconConfig, ConfigResolver, HttpRemoteConfigBackend, RemoteConfigBackend,
    RemoteConfigSettings,
};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::error::CliError;
use crate::output::{print_info, print_warning, OutputFormat};

/// beaconctl - send analytics events and read remote configuration.
#[derive(Debug, Parser)]
#[command(name = "beaconctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, global = true, env = "BEACON_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a single analytics event.
    Track(track::TrackCommand),

    /// Read remote configuration values.
    Config(config::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    pub fn log_filter(&self) -> &str {
        &self.log_level
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let config = BeaconConfig::from_env().map_err(CliError::from)?;
        let ctx = CommandContext {
            config,
            format: OutputFormat::parse(&self.format),
        };

        match self.command {
            Commands::Track(cmd) => cmd.run(ctx).await,
            Commands::Config(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("beaconctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: BeaconConfig,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Resolver over the configured remote config backend, initialized once.
    ///
    /// Without backend settings the resolver serves in-app defaults only.
    pub async fn resolver(&self) -> Result<ConfigResolver> {
        let backend: Option<Arc<dyn RemoteConfigBackend>> = match self.config.remote_config() {
            Some(settings) => Some(Arc::new(
                HttpRemoteConfigBackend::new(&settings).map_err(CliError::from)?,
            )),
            None => {
                print_info("Remote config not configured; showing defaults only.");
                None
            }
        };

        let resolver = ConfigResolver::new(backend, RemoteConfigSettings::from(&self.config));
        debug!(
            has_backend = resolver.has_backend(),
            min_interval_ms = resolver.settings().minimum_fetch_interval.as_millis() as u64,
            "Built remote config resolver"
        );
        if !resolver.initialize().await && resolver.has_backend() {
            print_warning("Remote config fetch failed; showing defaults only.");
        }
        Ok(resolver)
    }
}
