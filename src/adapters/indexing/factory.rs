//! Indexing sink factory
//!
//! Picks the sink implementation from configuration.

use super::dry_run::DryRunSink;
use super::ingestion::IngestionClient;
use super::search::SearchIndexClient;
use super::traits::BatchSink;
use crate::config::{CatalogSyncConfig, IndexVariant};
use crate::domain::Result;
use std::sync::Arc;

/// Create the batch sink for a run
///
/// Dry run wins over the configured variant.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn create_batch_sink(config: &CatalogSyncConfig, dry_run: bool) -> Result<Arc<dyn BatchSink>> {
    if dry_run {
        tracing::info!("Dry run enabled, batches will not be sent");
        return Ok(Arc::new(DryRunSink::new()));
    }

    match config.indexing.variant {
        IndexVariant::Search => {
            tracing::info!(base_url = %config.indexing.base_url, "Creating search batch client");
            Ok(Arc::new(SearchIndexClient::new(&config.indexing)?))
        }
        IndexVariant::Ingestion => {
            tracing::info!(base_url = %config.indexing.base_url, "Creating ingestion client");
            Ok(Arc::new(IngestionClient::new(&config.indexing)?))
        }
    }
}
