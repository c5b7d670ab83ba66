//! Recording sink
//!
//! Keeps every batch it receives in memory and can be told to fail for
//! given targets or call numbers. Useful for embedding the engine and for
//! exercising failure paths without a server.

use super::traits::{BatchReceipt, BatchSink};
use crate::core::sync::operation::Operation;
use crate::domain::{IndexTarget, IndexingError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBatch {
    /// 1-based call number across all targets
    pub call: usize,

    /// Target the batch was sent to
    pub target: IndexTarget,

    /// Operations in the batch
    pub operations: Vec<Operation>,

    /// Whether the call was made to fail
    pub failed: bool,
}

/// Sink that records batches and fails on demand
#[derive(Debug, Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<RecordedBatch>>,
    failing_targets: HashSet<String>,
    failing_calls: HashSet<usize>,
}

impl RecordingSink {
    /// Create a sink where every call succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call to the target with this index name or task id
    pub fn fail_target(mut self, target: impl Into<String>) -> Self {
        self.failing_targets.insert(target.into());
        self
    }

    /// Fail the n-th call (1-based)
    pub fn fail_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Copy of all recorded batches in call order
    pub fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Number of calls received
    pub fn calls(&self) -> usize {
        self.batches.lock().map(|b| b.len()).unwrap_or_default()
    }

    /// Recorded batches for one target
    pub fn batches_for(&self, target: &str) -> Vec<RecordedBatch> {
        self.batches()
            .into_iter()
            .filter(|b| b.target.as_str() == target)
            .collect()
    }
}

#[async_trait]
impl BatchSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send_batch(
        &self,
        target: &IndexTarget,
        operations: &[Operation],
    ) -> Result<BatchReceipt, IndexingError> {
        let mut batches = self
            .batches
            .lock()
            .map_err(|_| IndexingError::ConnectionFailed("recording sink poisoned".to_string()))?;

        let call = batches.len() + 1;
        let failed =
            self.failing_calls.contains(&call) || self.failing_targets.contains(target.as_str());

        batches.push(RecordedBatch {
            call,
            target: target.clone(),
            operations: operations.to_vec(),
            failed,
        });

        if failed {
            return Err(IndexingError::ServerError {
                status: 500,
                message: format!("simulated failure for call {call}"),
            });
        }

        Ok(BatchReceipt {
            accepted: operations.len(),
            reference: Some(format!("call-{call}")),
        })
    }
}
