//! Full-scan job
//!
//! A single self-owned loop over the whole catalog, without host stepping.
//! Records rejected by the inclusion filter are skipped before counting and
//! the chunk size is fixed at [`FULL_SCAN_CHUNK_SIZE`]. Time spent fetching,
//! transforming and dispatching is tracked for diagnostics.

use super::chunk::ChunkAccumulator;
use super::dispatcher::BatchDispatcher;
use super::engine::{failure_message, JobParameters};
use super::runner::{RunOutcome, INTERRUPTED_MESSAGE};
use super::targets::resolve_routes;
use crate::adapters::catalog::{CatalogSource, CursorGuard, IncludeAll, ProductFilter, RecordFilter};
use crate::adapters::indexing::BatchSink;
use crate::config::CatalogSyncConfig;
use crate::core::state::{RunLog, StateManager};
use crate::core::transform::{localize_record, LocalizedTransform};
use crate::domain::Result;
use crate::log_run_summary;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Chunk size of a full scan
pub const FULL_SCAN_CHUNK_SIZE: usize = 500;

/// Accumulated time per pipeline phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub cursor_fetch: Duration,
    pub transform: Duration,
    pub dispatch: Duration,
}

impl PhaseTimings {
    /// Log the timings at debug level
    pub fn log(&self) {
        tracing::debug!(
            cursor_fetch_ms = self.cursor_fetch.as_millis() as u64,
            transform_ms = self.transform.as_millis() as u64,
            dispatch_ms = self.dispatch.as_millis() as u64,
            "Full scan timings"
        );
    }
}

/// Loop state of one scan
#[derive(Default)]
struct ScanProgress {
    timings: PhaseTimings,
    filtered: u64,
    interrupted: bool,
    failure: Option<String>,
}

/// Self-driving synchronization over the whole catalog
pub struct FullScanJob {
    config: Arc<CatalogSyncConfig>,
    catalog: Arc<dyn CatalogSource>,
    sink: Arc<dyn BatchSink>,
    transform: Arc<dyn LocalizedTransform>,
    filter: Arc<dyn RecordFilter>,
    state_manager: StateManager,
    shutdown: watch::Receiver<bool>,
}

impl FullScanJob {
    /// Create a job with the filter chosen by `catalog.include_offline`
    pub fn new(
        config: Arc<CatalogSyncConfig>,
        catalog: Arc<dyn CatalogSource>,
        sink: Arc<dyn BatchSink>,
        transform: Arc<dyn LocalizedTransform>,
        state_manager: StateManager,
    ) -> Self {
        let filter: Arc<dyn RecordFilter> = if config.catalog.include_offline {
            Arc::new(IncludeAll)
        } else {
            Arc::new(ProductFilter::new())
        };
        let (_tx, shutdown) = watch::channel(false);

        Self {
            config,
            catalog,
            sink,
            transform,
            filter,
            state_manager,
            shutdown,
        }
    }

    /// Replace the inclusion filter
    pub fn with_filter(mut self, filter: Arc<dyn RecordFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Stop reading once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run the scan and persist the run log
    ///
    /// # Errors
    ///
    /// Only when the run log cannot be persisted.
    pub async fn run(&self, params: &JobParameters) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("full_scan", run_id = %run_id);
        self.execute(run_id, params).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid, params: &JobParameters) -> Result<RunOutcome> {
        let started = Instant::now();
        let mut log = self.state_manager.load_previous().await;
        log.begin_run(run_id, Utc::now());

        let (dispatcher, mut cursor) = match self.prepare(params).await {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!(error = %e, "Full scan failed to start");
                log.finish(false, Some(&failure_message(&e)), Utc::now());
                self.state_manager.persist(&log).await?;
                return Ok(RunOutcome {
                    run_id,
                    log,
                    succeeded: false,
                    interrupted: false,
                    configuration_error: e.is_configuration(),
                    fatal: !e.is_configuration(),
                    duration: started.elapsed(),
                });
            }
        };

        tracing::info!(
            total = cursor.count(),
            locales = dispatcher.routes().len(),
            "Full scan started"
        );

        let progress = self.scan(&dispatcher, &mut cursor, &mut log).await;
        cursor.close();

        let mut failure = progress.failure.clone();
        if failure.is_none() && self.config.sync.fail_on_dispatch_errors && log.failed_records > 0 {
            failure = Some(format!("{} records failed to send", log.failed_records));
        }
        let succeeded = failure.is_none();

        log.finish(succeeded, failure.as_deref(), Utc::now());
        tracing::info!(filtered = progress.filtered, "Records skipped by inclusion filter");
        progress.timings.log();
        log_run_summary!(&log, started.elapsed());
        self.state_manager.persist(&log).await?;

        Ok(RunOutcome {
            run_id,
            log,
            succeeded,
            interrupted: progress.interrupted,
            configuration_error: false,
            fatal: progress.failure.is_some() && !progress.interrupted,
            duration: started.elapsed(),
        })
    }

    async fn prepare(&self, params: &JobParameters) -> Result<(BatchDispatcher, CursorGuard)> {
        let routes = resolve_routes(&self.config, params.locale.as_deref()).await?;
        let dispatcher = BatchDispatcher::new(Arc::clone(&self.sink), routes)
            .with_mode(self.config.sync.dispatch_mode, self.config.sync.max_concurrency);
        let cursor = self.catalog.open().await?;
        Ok((dispatcher, CursorGuard::new(cursor)))
    }

    async fn scan(
        &self,
        dispatcher: &BatchDispatcher,
        cursor: &mut CursorGuard,
        log: &mut RunLog,
    ) -> ScanProgress {
        let mut progress = ScanProgress::default();
        let locales = dispatcher.locales();
        let mut accumulator = match ChunkAccumulator::new(FULL_SCAN_CHUNK_SIZE) {
            Ok(acc) => acc,
            Err(e) => {
                progress.failure = Some(failure_message(&e));
                return progress;
            }
        };

        loop {
            if *self.shutdown.borrow() {
                tracing::warn!(processed = log.processed_records, "Shutdown requested, stopping scan");
                progress.interrupted = true;
                progress.failure = Some(INTERRUPTED_MESSAGE.to_string());
                break;
            }

            let fetch = Instant::now();
            let next = cursor.next_record().await;
            progress.timings.cursor_fetch += fetch.elapsed();

            let record = match next {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Full scan aborted on read");
                    progress.failure = Some(e.to_string());
                    return progress;
                }
            };

            if !self.filter.is_included(&record) {
                progress.filtered += 1;
                continue;
            }

            let transform = Instant::now();
            let set = localize_record(self.transform.as_ref(), &record, &locales);
            progress.timings.transform += transform.elapsed();

            let set = match set {
                Ok(set) => set,
                Err(e) => {
                    tracing::error!(record = record.label(), error = %e, "Full scan aborted on transform");
                    progress.failure = Some(failure_message(&e));
                    return progress;
                }
            };
            log.processed_records += 1;

            let full = match accumulator.append(set) {
                Ok(full) => full,
                Err(e) => {
                    progress.failure = Some(failure_message(&e));
                    return progress;
                }
            };
            if full {
                if let Some(chunk) = accumulator.take_full() {
                    let dispatch = Instant::now();
                    dispatcher.dispatch(&chunk, log).await;
                    progress.timings.dispatch += dispatch.elapsed();
                }
            }
        }

        if let Some(chunk) = accumulator.flush_remainder() {
            let dispatch = Instant::now();
            dispatcher.dispatch(&chunk, log).await;
            progress.timings.dispatch += dispatch.elapsed();
        }

        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::MemoryCatalog;
    use crate::adapters::indexing::RecordingSink;
    use crate::adapters::storage::MemoryRunLogStore;
    use crate::config::parse_config;
    use crate::core::transform::AttributeLocalizer;
    use crate::domain::Record;
    use serde_json::json;

    fn config(include_offline: bool) -> Arc<CatalogSyncConfig> {
        Arc::new(
            parse_config(&format!(
                r#"
[site]
allowed_locales = ["en_US", "fr_FR"]

[catalog]
path = "unused.jsonl"
include_offline = {include_offline}

[indexing]
base_url = "http://localhost/1/indexes/"
index_prefix = "shop"

[sync]
mode = "full_scan"

[logging]
local_enabled = false
"#
            ))
            .unwrap(),
        )
    }

    fn products(n: usize, offline_every: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let online = offline_every == 0 || i % offline_every != 0;
                Record::from_value(json!({"id": format!("P{i}"), "online": online}), "id").unwrap()
            })
            .collect()
    }

    fn job(config: Arc<CatalogSyncConfig>, catalog: &MemoryCatalog, sink: Arc<RecordingSink>) -> FullScanJob {
        FullScanJob::new(
            config,
            Arc::new(catalog.clone()),
            sink,
            Arc::new(AttributeLocalizer::new("id")),
            StateManager::new(Arc::new(MemoryRunLogStore::new())),
        )
    }

    #[tokio::test]
    async fn test_full_scan_chunks_of_500() {
        let catalog = MemoryCatalog::new(products(1200, 0));
        let sink = Arc::new(RecordingSink::new());
        let outcome = job(config(false), &catalog, sink.clone())
            .run(&JobParameters::for_locale("en_US"))
            .await
            .unwrap();

        assert!(outcome.succeeded);
        assert_eq!(outcome.log.processed_records, 1200);
        assert_eq!(outcome.log.sent_chunks, 3);
        let sizes: Vec<_> = sink.batches().iter().map(|b| b.operations.len()).collect();
        assert_eq!(sizes, vec![500, 500, 200]);
        assert_eq!(catalog.close_count(), 1);
    }

    #[tokio::test]
    async fn test_filter_applies_before_counting() {
        // Every third product is offline
        let catalog = MemoryCatalog::new(products(9, 3));
        let sink = Arc::new(RecordingSink::new());
        let outcome = job(config(false), &catalog, sink.clone())
            .run(&JobParameters::all_locales())
            .await
            .unwrap();

        assert_eq!(outcome.log.processed_records, 6);
        assert_eq!(outcome.log.sent_records, 12);
        assert_eq!(sink.batches_for("shop__products__fr_FR").len(), 1);
    }

    #[tokio::test]
    async fn test_include_offline_disables_filter() {
        let catalog = MemoryCatalog::new(products(9, 3));
        let sink = Arc::new(RecordingSink::new());
        let outcome = job(config(true), &catalog, sink)
            .run(&JobParameters::for_locale("fr_FR"))
            .await
            .unwrap();

        assert_eq!(outcome.log.processed_records, 9);
    }

    #[tokio::test]
    async fn test_failing_locale_counts_per_locale() {
        let catalog = MemoryCatalog::new(products(3, 0));
        let sink = Arc::new(RecordingSink::new().fail_target("shop__products__fr_FR"));
        let outcome = job(config(false), &catalog, sink)
            .run(&JobParameters::all_locales())
            .await
            .unwrap();

        assert!(outcome.succeeded);
        assert_eq!(outcome.log.sent_chunks, 1);
        assert_eq!(outcome.log.sent_records, 3);
        assert_eq!(outcome.log.failed_chunks, 1);
        assert_eq!(outcome.log.failed_records, 3);
    }

    #[tokio::test]
    async fn test_read_failure_closes_cursor() {
        let catalog = MemoryCatalog::new(products(4, 0)).failing_read_at(2).failing_close();
        let sink = Arc::new(RecordingSink::new());
        let outcome = job(config(false), &catalog, sink.clone())
            .run(&JobParameters::for_locale("en_US"))
            .await
            .unwrap();

        assert!(!outcome.succeeded);
        assert!(outcome.fatal);
        assert!(outcome.log.processed_error);
        assert_eq!(sink.calls(), 0);
        assert_eq!(catalog.close_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_indexing_never_opens_cursor() {
        let mut cfg = (*config(false)).clone();
        cfg.indexing.enabled = false;
        let catalog = MemoryCatalog::new(products(2, 0));
        let sink = Arc::new(RecordingSink::new());
        let outcome = job(Arc::new(cfg), &catalog, sink.clone())
            .run(&JobParameters::all_locales())
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(outcome.log.processed_error_message, "Catalog sync is disabled");
        assert_eq!(catalog.close_count(), 0);
        assert_eq!(sink.calls(), 0);
    }
}
