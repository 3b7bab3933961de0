//! Milvus collection manager CLI
//!
//! This binary provides the command-line interface for managing a single
//! collection's lifecycle.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::Result;
use clap::{Parser, Subcommand};
use milvus_manager::{commands, load_config};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "milvus-manager")]
#[command(about = "Manage the lifecycle of a Milvus collection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use an in-memory database instead of a server
    #[arg(long, global = true)]
    mock: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the collection, its fields and index settings
    Status,
    /// Create the collection if missing, then index and load it
    Create {
        /// Vector dimension for a new collection
        #[arg(long)]
        dimension: Option<usize>,
    },
    /// Drop the collection
    Drop,
    /// Drop the collection and recreate it empty
    Truncate,
    /// Build an index on the vector field unless one exists
    Index,
    /// Delete entities matching a filter expression
    Delete {
        /// Boolean filter, e.g. "pk in [1, 2]"
        expression: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let dimension = match &cli.command {
        Commands::Create { dimension } => *dimension,
        _ => None,
    };
    let config = load_config(cli.config.as_deref(), dimension)?;
    debug!(
        "Managing collection {} at {}",
        config.collection_name, config.connection_address
    );

    let manager = commands::connect(config, cli.mock).await?;
    let output = match cli.command {
        Commands::Status => commands::status(&manager).await?,
        Commands::Create { .. } => commands::create(&manager).await?,
        Commands::Drop => commands::drop(&manager).await?,
        Commands::Truncate => commands::truncate(&manager).await?,
        Commands::Index => commands::index(&manager).await?,
        Commands::Delete { expression } => commands::delete(&manager, &expression).await?,
    };
    println!("{output}");

    Ok(())
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "milvus_manager_storage={level},milvus_manager_core={level},{}={level}",
            env!("CARGO_CRATE_NAME")
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
