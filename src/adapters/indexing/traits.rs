//! Indexing service abstraction
//!
//! A [`BatchSink`] receives one batch of operations for one resolved
//! target. Implementations report failures as [`IndexingError`]; the
//! dispatcher turns them into counters.

use crate::core::sync::operation::Operation;
use crate::domain::{IndexTarget, IndexingError};
use async_trait::async_trait;

/// What the service returned for an accepted batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReceipt {
    /// Number of operations the service acknowledged
    pub accepted: usize,

    /// Service-side reference (task id, event id) when one is returned
    pub reference: Option<String>,
}

/// Outcome of one batch call in the `{ok, error, message}` shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStatus {
    /// The call succeeded
    pub ok: bool,

    /// The call failed
    pub error: bool,

    /// Service reference on success, error text on failure
    pub message: String,
}

impl SendStatus {
    /// Successful status
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error: false,
            message: message.into(),
        }
    }

    /// Failed status
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: true,
            message: message.into(),
        }
    }
}

impl From<&Result<BatchReceipt, IndexingError>> for SendStatus {
    fn from(result: &Result<BatchReceipt, IndexingError>) -> Self {
        match result {
            Ok(receipt) => SendStatus::success(receipt.reference.clone().unwrap_or_default()),
            Err(e) => SendStatus::failure(e.to_string()),
        }
    }
}

/// Destination for batches of operations
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Short name for logs (`search`, `ingestion`, `dry-run`)
    fn name(&self) -> &str;

    /// Send all operations for one target in a single call
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-success statuses, or a
    /// target kind this sink cannot route to.
    async fn send_batch(
        &self,
        target: &IndexTarget,
        operations: &[Operation],
    ) -> Result<BatchReceipt, IndexingError>;
}
