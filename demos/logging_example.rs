//! Example demonstrating the catalog-sync logging system
//!
//! This example shows how to:
//! - Initialize structured logging with a rotating JSON file
//! - Use the dispatch and run summary logging macros
//!
//! Run with:
//! ```bash
//! cargo run --example logging_example
//! ```

use catalog_sync::config::LoggingConfig;
use catalog_sync::core::state::RunLog;
use catalog_sync::domain::{IndexTarget, Locale};
use catalog_sync::logging::init_logging;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggingConfig {
        local_enabled: true,
        local_path: "/tmp/catalog_sync_example".to_string(),
        local_rotation: "daily".to_string(),
        console_json: false,
    };

    // Keep the guard alive for the duration of the program
    let guard = init_logging("debug", &config)?;
    tracing::info!(file_logging = guard.has_file_writer(), "Logging example started");

    let mut log = RunLog::default();
    let en = Locale::new("en_US")?;
    let fr = Locale::new("fr_FR")?;
    let en_index = IndexTarget::product_index("demo", &en);
    let fr_index = IndexTarget::product_index("demo", &fr);

    // One chunk of 500 records: English goes through, French fails
    log.processed_records += 500;
    log.sent_chunks += 1;
    catalog_sync::log_chunk_dispatched!(1u64, en, en_index, 500usize);
    log.record_sent(500);
    catalog_sync::log_locale_failure!(1u64, fr, fr_index, 500usize, "Server error: 503 - unavailable");
    log.record_failed(500);

    std::thread::sleep(Duration::from_millis(50));

    catalog_sync::log_run_summary!(&log, Duration::from_millis(50));

    println!("Logs written to {}", config.local_path);
    Ok(())
}
