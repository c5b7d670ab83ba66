//! Run log storage abstraction

use crate::core::state::RunLog;
use crate::domain::Result;
use async_trait::async_trait;

/// Persistence backend for run logs
///
/// Logs are stored under a fixed name and overwritten on every run; no
/// history is kept.
#[async_trait]
pub trait RunLogStore: Send + Sync {
    /// Load the log stored under `name`
    ///
    /// Returns `Ok(None)` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored log exists but cannot be read or parsed.
    async fn load(&self, name: &str) -> Result<Option<RunLog>>;

    /// Replace the log stored under `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    async fn save(&self, name: &str, log: &RunLog) -> Result<()>;
}
