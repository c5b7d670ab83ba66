//! Dry-run sink
//!
//! Accepts every batch without network traffic. Used by `--dry-run`.

use super::traits::{BatchReceipt, BatchSink};
use crate::core::sync::operation::Operation;
use crate::domain::{IndexTarget, IndexingError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sink that logs batches instead of sending them
#[derive(Debug, Default)]
pub struct DryRunSink {
    batches: AtomicU64,
    operations: AtomicU64,
}

impl DryRunSink {
    /// Create a dry-run sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches accepted so far
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    /// Operations accepted so far
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BatchSink for DryRunSink {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send_batch(
        &self,
        target: &IndexTarget,
        operations: &[Operation],
    ) -> Result<BatchReceipt, IndexingError> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.operations
            .fetch_add(operations.len() as u64, Ordering::Relaxed);

        tracing::info!(
            target = %target,
            operations = operations.len(),
            "Dry run: batch not sent"
        );

        Ok(BatchReceipt {
            accepted: operations.len(),
            reference: None,
        })
    }
}
