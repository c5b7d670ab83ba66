//! Search batch API client
//!
//! Sends `POST {base_url}{index_name}/batch` with `{"requests": [...]}`.

use super::http::{reference_field, HttpTransport};
use super::traits::{BatchReceipt, BatchSink};
use crate::config::IndexingConfig;
use crate::core::sync::operation::Operation;
use crate::domain::{IndexTarget, IndexingError, Result};
use async_trait::async_trait;

/// Client for the per-index batch endpoint
#[derive(Debug, Clone)]
pub struct SearchIndexClient {
    transport: HttpTransport,
}

impl SearchIndexClient {
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
impl BatchSink for SearchIndexClient {
    fn name(&self) -> &str {
        "search"
    }

    async fn send_batch(
        &self,
        target: &IndexTarget,
        operations: &[Operation],
    ) -> std::result::Result<BatchReceipt, IndexingError> {
        let IndexTarget::Index(index_name) = target else {
            return Err(IndexingError::UnsupportedTarget(target.to_string()));
        };

        let body = self
            .transport
            .post_batch(&format!("{index_name}/batch"), operations)
            .await?;

        Ok(BatchReceipt {
            accepted: operations.len(),
            reference: reference_field(&body, "taskID"),
        })
    }
}
