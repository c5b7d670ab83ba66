//! Logging and observability
//!
//! Structured logging with:
//! - Configurable log levels (`RUST_LOG` wins over the config file)
//! - Human-readable or JSON console output
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use catalog_sync::logging::init_logging;
//! use catalog_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(locale = "en_US", "Sync started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a successful (chunk, locale) dispatch
///
/// # Example
///
/// ```no_run
/// use catalog_sync::log_chunk_dispatched;
///
/// log_chunk_dispatched!(3, "en_US", "index:shop__products__en_US", 500);
/// ```
#[macro_export]
macro_rules! log_chunk_dispatched {
    ($chunk:expr, $locale:expr, $target:expr, $operations:expr) => {
        tracing::debug!(
            chunk = $chunk,
            locale = %$locale,
            target = %$target,
            operations = $operations,
            "Chunk dispatched"
        );
    };
}

/// Log a failed (chunk, locale) dispatch
///
/// # Example
///
/// ```no_run
/// use catalog_sync::log_locale_failure;
///
/// log_locale_failure!(3, "fr_FR", "task:abc", 500, "Server error: 503 - unavailable");
/// ```
#[macro_export]
macro_rules! log_locale_failure {
    ($chunk:expr, $locale:expr, $target:expr, $operations:expr, $error:expr) => {
        tracing::error!(
            chunk = $chunk,
            locale = %$locale,
            target = %$target,
            operations = $operations,
            error = %$error,
            "Failed to send chunk"
        );
    };
}

/// Log the counters of a finished run
///
/// # Example
///
/// ```no_run
/// use catalog_sync::log_run_summary;
/// use catalog_sync::core::state::RunLog;
/// use std::time::Duration;
///
/// let log = RunLog::default();
/// log_run_summary!(&log, Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_run_summary {
    ($log:expr, $duration:expr) => {
        tracing::info!(
            processed_records = $log.processed_records,
            sent_chunks = $log.sent_chunks,
            sent_records = $log.sent_records,
            failed_chunks = $log.failed_chunks,
            failed_records = $log.failed_records,
            duration_ms = $duration.as_millis() as u64,
            "Run finished"
        );
    };
}
