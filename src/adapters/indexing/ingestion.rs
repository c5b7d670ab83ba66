//! Ingestion API client
//!
//! Pushes operations to a task: `POST {base_url}tasks/{task_id}/push` with
//! the same `{"requests": [...]}` body as the search batch endpoint.

use super::http::{reference_field, HttpTransport};
use super::traits::{BatchReceipt, BatchSink};
use crate::config::IndexingConfig;
use crate::core::sync::operation::Operation;
use crate::domain::{IndexTarget, IndexingError, Result};
use async_trait::async_trait;

/// Client for task-routed ingestion
#[derive(Debug, Clone)]
pub struct IngestionClient {
    transport: HttpTransport,
}

impl IngestionClient {
    /// Create a client from the indexing configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &IndexingConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }
}

#[async_trait]
impl BatchSink for IngestionClient {
    fn name(&self) -> &str {
        "ingestion"
    }

    async fn send_batch(
        &self,
        target: &IndexTarget,
        operations: &[Operation],
    ) -> std::result::Result<BatchReceipt, IndexingError> {
        let IndexTarget::Task(task_id) = target else {
            return Err(IndexingError::UnsupportedTarget(target.to_string()));
        };

        let body = self
            .transport
            .post_batch(&format!("tasks/{task_id}/push"), operations)
            .await?;

        Ok(BatchReceipt {
            accepted: operations.len(),
            reference: reference_field(&body, "eventID").or_else(|| reference_field(&body, "runID")),
        })
    }
}
