//! State manager for run log persistence
//!
//! Wraps a [`RunLogStore`] with the fixed log name and the load policy of a
//! run: a missing or unreadable previous log starts the run from an empty one.

use crate::adapters::storage::RunLogStore;
use crate::core::state::RunLog;
use crate::domain::Result;
use std::sync::Arc;

/// Default name of the persisted run log
pub const DEFAULT_LOG_NAME: &str = "LastProductSyncLog";

/// Loads and saves the run log under one fixed name
#[derive(Clone)]
pub struct StateManager {
    storage: Arc<dyn RunLogStore>,
    log_name: String,
}

impl StateManager {
    /// Create a state manager using the default log name
    pub fn new(storage: Arc<dyn RunLogStore>) -> Self {
        Self::with_log_name(storage, DEFAULT_LOG_NAME)
    }

    /// Create a state manager with a custom log name
    pub fn with_log_name(storage: Arc<dyn RunLogStore>, log_name: impl Into<String>) -> Self {
        Self {
            storage,
            log_name: log_name.into(),
        }
    }

    /// Name the log is stored under
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// Load the previous run's log, or an empty one
    ///
    /// Read failures are logged and treated as "no previous log", since the
    /// log is overwritten at the end of the run anyway.
    pub async fn load_previous(&self) -> RunLog {
        match self.storage.load(&self.log_name).await {
            Ok(Some(log)) => log,
            Ok(None) => {
                tracing::debug!(log_name = %self.log_name, "No previous run log");
                RunLog::default()
            }
            Err(e) => {
                tracing::warn!(
                    log_name = %self.log_name,
                    error = %e,
                    "Ignoring unreadable previous run log"
                );
                RunLog::default()
            }
        }
    }

    /// Load the stored log without fallback
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load(&self) -> Result<Option<RunLog>> {
        self.storage.load(&self.log_name).await
    }

    /// Persist the log, replacing the previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn persist(&self, log: &RunLog) -> Result<()> {
        tracing::info!(
            log_name = %self.log_name,
            processed_records = log.processed_records,
            processed_error = log.processed_error,
            "Persisting run log"
        );
        self.storage.save(&self.log_name, log).await
    }
}
