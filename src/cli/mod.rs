//! CLI entry point
//!
//! All process setup lives here; `main` only dispatches and reports
//! failure. `serve` boots the store, seeds the built-in types and runs the
//! HTTP server until the process is stopped.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::bootstrap;
use crate::config::ServerConfig;
use crate::observability::{Event, Logger};
use crate::repository::RepositoryFactory;
use crate::rest_api;
use crate::storage::{DataStore, MemoryStore, StorageError};

/// CLI failures surfaced to `main`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("seeding built-in types failed: {0}")]
    Seed(#[from] StorageError),
}

#[derive(Parser)]
#[command(name = "proteandb", version, about = "Document store with runtime-defined entity types")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Bind host (overrides PROTEAN_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PROTEAN_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Parses arguments and runs the selected command.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port } => {
            let mut config = ServerConfig::from_env();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serve(config))
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), CliError> {
    Logger::info(Event::BootStart, &[]);

    let store: Arc<dyn DataStore> = MemoryStore::new();
    bootstrap::populate(&store).await?;

    let factory = RepositoryFactory::new(store);
    Logger::info(Event::BootComplete, &[]);

    rest_api::serve(factory, &config).await?;

    Logger::info(Event::ShutdownComplete, &[]);
    Ok(())
}
