//! Sync command implementation
//!
//! This module implements the `sync` command, which pushes the product
//! catalog to the search index for every allowed locale or a single one.

use crate::adapters::catalog::JsonlCatalog;
use crate::adapters::indexing::create_batch_sink;
use crate::adapters::storage::FileRunLogStore;
use crate::config::{load_config, CatalogSyncConfig, SyncMode};
use crate::core::state::StateManager;
use crate::core::sync::{FullScanJob, JobParameters, JobRunner, RunOutcome, SyncEngine};
use crate::core::transform::AttributeLocalizer;
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Arguments for the sync command
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Sync a single locale instead of every allowed locale
    #[arg(long)]
    pub locale: Option<String>,

    /// Override sync mode (chunked or full_scan)
    #[arg(long)]
    pub mode: Option<String>,

    /// Dry run mode - count operations without calling the indexing service
    #[arg(long)]
    pub dry_run: bool,

    /// Override the chunk size of the chunked engine
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl SyncArgs {
    /// Apply command-line overrides on top of the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown mode or when the result does not validate.
    pub fn apply_overrides(&self, config: &mut CatalogSyncConfig) -> Result<(), String> {
        if let Some(mode) = &self.mode {
            tracing::info!(mode = %mode, "Overriding sync mode from CLI");
            config.sync.mode = SyncMode::from_str(mode)?;
        }

        if let Some(chunk_size) = self.chunk_size {
            tracing::info!(chunk_size, "Overriding chunk size from CLI");
            config.sync.chunk_size = chunk_size;
        }

        if let Some(locale) = &self.locale {
            tracing::info!(locale = %locale, "Restricting sync to one locale");
            config.sync.locale = Some(locale.clone());
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        config.validate()
    }

    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            println!("DRY RUN MODE - no batches will be sent to the indexing service");
            println!();
        }

        let config = Arc::new(config);
        let params = JobParameters {
            locale: config.sync.locale.clone(),
        };

        let outcome = match run_sync(Arc::clone(&config), &params, dry_run, shutdown_signal).await {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&config, &outcome);
        Ok(outcome.exit_code())
    }
}

/// Wire the adapters from configuration and run the selected mode
///
/// # Errors
///
/// Returns an error when the indexing client cannot be built or the run
/// log cannot be persisted.
pub async fn run_sync(
    config: Arc<CatalogSyncConfig>,
    params: &JobParameters,
    dry_run: bool,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<RunOutcome> {
    let sink = create_batch_sink(&config, dry_run)?;
    let catalog = Arc::new(JsonlCatalog::new(
        &config.catalog.path,
        &config.catalog.id_field,
    ));
    let transform = Arc::new(
        AttributeLocalizer::new(&config.catalog.id_field)
            .with_attributes(config.sync.attributes.clone()),
    );
    let state_manager = StateManager::with_log_name(
        Arc::new(FileRunLogStore::new(&config.state.directory)),
        &config.state.log_name,
    );

    tracing::info!(
        mode = ?config.sync.mode,
        sink = sink.name(),
        locale = params.locale.as_deref().unwrap_or("all"),
        "Running sync"
    );

    let outcome = match config.sync.mode {
        SyncMode::Chunked => {
            let mut engine = SyncEngine::new(
                Arc::clone(&config),
                catalog,
                sink,
                transform,
                state_manager,
            );
            let span = tracing::info_span!("sync_run", run_id = %engine.run_id());
            let runner = JobRunner::new(shutdown_signal);
            let outcome = runner.run(&mut engine, params).instrument(span).await?;
            outcome
        }
        SyncMode::FullScan => {
            let job =
                FullScanJob::new(Arc::clone(&config), catalog, sink, transform, state_manager)
                    .with_shutdown(shutdown_signal);
            let outcome = job.run(params).await?;
            outcome
        }
    };

    Ok(outcome)
}

fn print_summary(config: &CatalogSyncConfig, outcome: &RunOutcome) {
    println!();
    print!("{}", render_summary(config, outcome));
}

/// Human-readable summary of a finished run
pub fn render_summary(config: &CatalogSyncConfig, outcome: &RunOutcome) -> String {
    let log = &outcome.log;
    let mut out = String::new();

    out.push_str("Sync Summary:\n");
    out.push_str(&format!("  Run ID: {}\n", outcome.run_id));
    out.push_str(&format!("  Mode: {:?}\n", config.sync.mode));
    out.push_str(&format!("  Processed Records: {}\n", log.processed_records));
    out.push_str(&format!("  Sent Chunks: {}\n", log.sent_chunks));
    out.push_str(&format!("  Sent Records: {}\n", log.sent_records));
    out.push_str(&format!("  Failed Chunks: {}\n", log.failed_chunks));
    out.push_str(&format!("  Failed Records: {}\n", log.failed_records));
    out.push_str(&format!("  Duration: {:.2}s\n\n", outcome.duration.as_secs_f64()));

    let verdict = if outcome.interrupted {
        "Sync interrupted. The open chunk was flushed and the run log saved.".to_string()
    } else if outcome.configuration_error {
        format!("Sync not started: {}", log.processed_error_message)
    } else if !outcome.succeeded {
        format!("Sync failed: {}", log.processed_error_message)
    } else if !log.is_clean() {
        format!(
            "Sync completed with {} failed batches ({} records)",
            log.failed_chunks, log.failed_records
        )
    } else {
        "Sync completed successfully!".to_string()
    };
    out.push_str(&verdict);
    out.push('\n');
    out
}
