//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for catalog-sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// catalog-sync - product catalog to search index synchronization
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version, about, long_about = None)]
#[command(author = "Catalog Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "catalog-sync.toml", env = "CATALOG_SYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CATALOG_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize the catalog into the search index
    Sync(commands::sync::SyncArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the run log of the last sync
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
