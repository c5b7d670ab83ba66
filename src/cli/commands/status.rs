//! Status command implementation
//!
//! This module implements the `status` command for displaying the run log
//! written by the last sync.

use crate::adapters::storage::FileRunLogStore;
use crate::config::load_config;
use crate::core::state::{RunLog, StateManager};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Print the run log as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let state_manager = StateManager::with_log_name(
            Arc::new(FileRunLogStore::new(&config.state.directory)),
            &config.state.log_name,
        );

        let log = match state_manager.load().await {
            Ok(Some(log)) => log,
            Ok(None) => {
                println!("No sync history found.");
                println!("Run 'catalog-sync sync' to start synchronizing.");
                return Ok(0);
            }
            Err(e) => {
                println!("Failed to load run log");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&log)?);
        } else {
            print!("{}", render_status(state_manager.log_name(), &log));
        }

        Ok(if log.processed_error { 1 } else { 0 })
    }
}

/// Human-readable view of a run log
pub fn render_status(log_name: &str, log: &RunLog) -> String {
    let status = if log.processed_error || log.send_error {
        "Failed"
    } else if log.failed_chunks > 0 {
        "Completed with failed batches"
    } else {
        "Completed"
    };
    let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Never".to_string())
    };

    let mut out = String::new();
    out.push_str(&format!("Sync Status ({log_name})\n\n"));
    out.push_str(&format!("  Status: {status}\n"));
    if let Some(run_id) = log.run_id {
        out.push_str(&format!("  Run ID: {run_id}\n"));
    }
    out.push_str(&format!("  Processed: {}\n", date(log.processed_date)));
    out.push_str(&format!("  Sent: {}\n", date(log.send_date)));
    out.push_str(&format!("  Duration: {:.2}s\n", log.duration_ms as f64 / 1000.0));
    out.push_str(&format!("  Processed Records: {}\n", log.processed_records));
    out.push_str(&format!("  Sent Chunks: {}\n", log.sent_chunks));
    out.push_str(&format!("  Sent Records: {}\n", log.sent_records));
    out.push_str(&format!("  Failed Chunks: {}\n", log.failed_chunks));
    out.push_str(&format!("  Failed Records: {}\n", log.failed_records));
    if !log.processed_error_message.is_empty() {
        out.push_str(&format!("  Error: {}\n", log.processed_error_message));
    }
    out
}
