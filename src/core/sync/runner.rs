//! Host loop driving a [`SyncEngine`] to completion

use super::engine::{failure_message, JobParameters, SyncEngine};
use crate::core::state::RunLog;
use crate::domain::{Result, SyncError};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Reason stored in the run log when a shutdown signal stops the run
pub const INTERRUPTED_MESSAGE: &str = "Run interrupted by shutdown signal";

/// What a finished run looks like to the caller
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub log: RunLog,
    pub succeeded: bool,
    /// A shutdown signal stopped reading
    pub interrupted: bool,
    /// The run was aborted before reading by a configuration problem
    pub configuration_error: bool,
    /// Reading or transforming failed mid-run
    pub fatal: bool,
    pub duration: Duration,
}

impl RunOutcome {
    /// Process exit code for this outcome
    ///
    /// 0 success, 1 completed with failed sends, 2 configuration error,
    /// 5 fatal error, 130 interrupted.
    pub fn exit_code(&self) -> i32 {
        if self.configuration_error {
            2
        } else if self.interrupted {
            130
        } else if self.fatal {
            5
        } else if !self.succeeded || self.log.failed_records > 0 {
            1
        } else {
            0
        }
    }
}

/// Steps an engine through read, transform, accumulate and dispatch
pub struct JobRunner {
    shutdown: watch::Receiver<bool>,
}

impl JobRunner {
    /// Create a runner that stops reading once `shutdown` turns true
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    /// Create a runner that is never interrupted
    pub fn without_shutdown() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(rx)
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run the engine to completion and persist the run log
    ///
    /// Full chunks are dispatched as soon as they fill; the short tail is
    /// flushed at end of input or on interruption. A read or transform
    /// error fails the run without sending the open chunk.
    ///
    /// # Errors
    ///
    /// Only when the run log cannot be persisted. Every other failure is
    /// reported through [`RunOutcome`].
    pub async fn run(&self, engine: &mut SyncEngine, params: &JobParameters) -> Result<RunOutcome> {
        if let Err(e) = engine.initialize(params).await {
            let log = engine.finalize(false).await?;
            return Ok(RunOutcome {
                run_id: engine.run_id(),
                log,
                succeeded: false,
                interrupted: false,
                configuration_error: e.is_configuration(),
                fatal: !e.is_configuration(),
                duration: engine.elapsed(),
            });
        }

        let total = engine.total_count();
        let mut interrupted = false;
        let mut fatal = false;

        loop {
            if self.shutdown_requested() {
                tracing::warn!(
                    processed = engine.run_log().processed_records,
                    "Shutdown requested, stopping after current chunk"
                );
                engine.record_failure(INTERRUPTED_MESSAGE);
                interrupted = true;
                break;
            }

            match self.step(engine).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Run aborted");
                    engine.record_failure(failure_message(&e));
                    fatal = true;
                    break;
                }
            }

            let processed = engine.run_log().processed_records;
            if total > 0 && processed % 1000 == 0 {
                tracing::info!(
                    processed,
                    total,
                    progress_pct = processed * 100 / total,
                    "Sync progress"
                );
            }
        }

        if !fatal {
            // Flush the short tail; dispatch failures are counted, not returned
            if let Err(e) = engine.dispatch().await {
                tracing::error!(error = %e, "Failed to flush last chunk");
                engine.record_failure(failure_message(&e));
                fatal = true;
            }
        }

        let log = engine.finalize(!fatal && !interrupted).await?;
        let succeeded = !log.processed_error;

        Ok(RunOutcome {
            run_id: engine.run_id(),
            log,
            succeeded,
            interrupted,
            configuration_error: false,
            fatal,
            duration: engine.elapsed(),
        })
    }

    /// One record through the pipeline; `false` at end of input
    async fn step(&self, engine: &mut SyncEngine) -> Result<bool> {
        let Some(record) = engine.read().await? else {
            return Ok(false);
        };
        let set = engine.transform(&record)?;
        if engine.accumulate(set)? {
            engine
                .dispatch()
                .await?
                .ok_or_else(|| SyncError::Engine("full chunk vanished".to_string()))?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::MemoryCatalog;
    use crate::adapters::indexing::RecordingSink;
    use crate::adapters::storage::MemoryRunLogStore;
    use crate::config::parse_config;
    use crate::core::state::StateManager;
    use crate::core::transform::AttributeLocalizer;
    use crate::domain::Record;
    use serde_json::json;
    use std::sync::Arc;

    const CONFIG: &str = r#"
[site]
allowed_locales = ["en_US", "fr_FR"]

[catalog]
path = "unused.jsonl"

[indexing]
base_url = "http://localhost/1/indexes/"
index_prefix = "shop"

[sync]
chunk_size = 2

[logging]
local_enabled = false
"#;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::from_value(json!({"id": format!("P{i}")}), "id").unwrap())
            .collect()
    }

    fn engine(catalog: &MemoryCatalog, sink: Arc<RecordingSink>) -> SyncEngine {
        SyncEngine::new(
            Arc::new(parse_config(CONFIG).unwrap()),
            Arc::new(catalog.clone()),
            sink,
            Arc::new(AttributeLocalizer::new("id")),
            StateManager::new(Arc::new(MemoryRunLogStore::new())),
        )
    }

    #[tokio::test]
    async fn test_run_to_completion() {
        let catalog = MemoryCatalog::new(records(5));
        let sink = Arc::new(RecordingSink::new());
        let mut engine = engine(&catalog, sink.clone());

        let outcome = JobRunner::without_shutdown()
            .run(&mut engine, &JobParameters::for_locale("fr_FR"))
            .await
            .unwrap();

        assert!(outcome.succeeded);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.log.processed_records, 5);
        assert_eq!(outcome.log.sent_chunks, 3);
        assert!(outcome.log.is_balanced());
        assert_eq!(sink.calls(), 3);
        assert_eq!(catalog.close_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_sends_keep_run_successful() {
        let catalog = MemoryCatalog::new(records(4));
        let sink = Arc::new(RecordingSink::new().fail_call(2));
        let mut engine = engine(&catalog, sink);

        let outcome = JobRunner::without_shutdown()
            .run(&mut engine, &JobParameters::for_locale("en_US"))
            .await
            .unwrap();

        assert!(outcome.succeeded);
        assert!(!outcome.log.processed_error);
        assert_eq!(outcome.log.failed_chunks, 1);
        assert_eq!(outcome.log.failed_records, 2);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_read_error_fails_run_and_closes_cursor() {
        let catalog = MemoryCatalog::new(records(5)).failing_read_at(3);
        let sink = Arc::new(RecordingSink::new());
        let mut engine = engine(&catalog, sink.clone());

        let outcome = JobRunner::without_shutdown()
            .run(&mut engine, &JobParameters::for_locale("en_US"))
            .await
            .unwrap();

        assert!(!outcome.succeeded);
        assert!(outcome.fatal);
        assert_eq!(outcome.exit_code(), 5);
        assert!(outcome.log.processed_error);
        assert_eq!(outcome.log.processed_records, 3);
        // The first full chunk went out, the open one did not
        assert_eq!(sink.calls(), 1);
        assert_eq!(catalog.close_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_and_marks_interrupted() {
        let catalog = MemoryCatalog::new(records(5));
        let sink = Arc::new(RecordingSink::new());
        let mut engine = engine(&catalog, sink.clone());

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let outcome = JobRunner::new(rx)
            .run(&mut engine, &JobParameters::all_locales())
            .await
            .unwrap();

        assert!(outcome.interrupted);
        assert_eq!(outcome.exit_code(), 130);
        assert_eq!(outcome.log.processed_error_message, INTERRUPTED_MESSAGE);
        assert_eq!(outcome.log.processed_records, 0);
        assert_eq!(sink.calls(), 0);
        assert_eq!(catalog.close_count(), 1);
    }

    #[tokio::test]
    async fn test_configuration_error_exit_code() {
        let catalog = MemoryCatalog::new(records(1));
        let sink = Arc::new(RecordingSink::new());
        let mut engine = engine(&catalog, sink);

        let outcome = JobRunner::without_shutdown()
            .run(&mut engine, &JobParameters::for_locale("de_DE"))
            .await
            .unwrap();

        assert!(outcome.configuration_error);
        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(outcome.log.processed_error_message, "Locale de_DE is not allowed.");
    }
}
