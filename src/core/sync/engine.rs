//! Chunk-oriented sync engine
//!
//! [`SyncEngine`] is a state machine stepped by a host:
//!
//! ```text
//! Idle → Initialized → (Reading → Transforming → Accumulating → Dispatching)* → Finalizing → Done | Failed
//! ```
//!
//! The engine owns everything that lives for one run: the cursor, the
//! resolved routes, the open chunk and the run log. `finalize` always
//! releases the cursor and persists the run log, whatever path led there.

use super::chunk::ChunkAccumulator;
use super::dispatcher::{BatchDispatcher, DispatchReport};
use super::targets::resolve_routes;
use crate::adapters::catalog::{CatalogSource, CursorGuard};
use crate::adapters::indexing::BatchSink;
use crate::config::CatalogSyncConfig;
use crate::core::state::{RunLog, StateManager};
use crate::core::transform::{localize_record, LocalizedTransform};
use crate::domain::{Locale, LocalizedDocumentSet, Record, Result, SyncError};
use crate::log_run_summary;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Parameters supplied by the host for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobParameters {
    /// Restrict the run to one locale; `None` means every allowed locale
    pub locale: Option<String>,
}

impl JobParameters {
    /// Run for every allowed site locale
    pub fn all_locales() -> Self {
        Self { locale: None }
    }

    /// Run for a single locale
    pub fn for_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: Some(locale.into()),
        }
    }
}

/// Engine lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Initialized,
    Reading,
    Transforming,
    Accumulating,
    Dispatching,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct ActiveRun {
    dispatcher: BatchDispatcher,
    accumulator: ChunkAccumulator,
    locales: Vec<Locale>,
}

/// Host-stepped synchronization engine
pub struct SyncEngine {
    config: Arc<CatalogSyncConfig>,
    catalog: Arc<dyn CatalogSource>,
    sink: Arc<dyn BatchSink>,
    transform: Arc<dyn LocalizedTransform>,
    state_manager: StateManager,

    state: EngineState,
    run_id: Uuid,
    started: Instant,
    run: Option<ActiveRun>,
    cursor: Option<CursorGuard>,
    log: RunLog,
    failure: Option<String>,
    finalized: bool,
}

impl SyncEngine {
    /// Create an idle engine
    pub fn new(
        config: Arc<CatalogSyncConfig>,
        catalog: Arc<dyn CatalogSource>,
        sink: Arc<dyn BatchSink>,
        transform: Arc<dyn LocalizedTransform>,
        state_manager: StateManager,
    ) -> Self {
        Self {
            config,
            catalog,
            sink,
            transform,
            state_manager,
            state: EngineState::Idle,
            run_id: Uuid::new_v4(),
            started: Instant::now(),
            run: None,
            cursor: None,
            log: RunLog::default(),
            failure: None,
            finalized: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Identifier of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Counters so far
    pub fn run_log(&self) -> &RunLog {
        &self.log
    }

    /// Locales in scope, in dispatch order
    pub fn locales(&self) -> &[Locale] {
        self.run.as_ref().map(|r| r.locales.as_slice()).unwrap_or(&[])
    }

    /// Time since the engine was initialized
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Reason the run is going to be reported as failed, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Resolve configuration, open the cursor and start the run log
    ///
    /// The previous run log is loaded as the base and its counters reset.
    ///
    /// # Errors
    ///
    /// Configuration problems (disabled indexing, missing mapping, bad or
    /// disallowed locale, no resolvable locale) and catalog open failures
    /// move the engine to [`EngineState::Failed`]; the host should still
    /// call [`SyncEngine::finalize`] so the failure is persisted.
    pub async fn initialize(&mut self, params: &JobParameters) -> Result<()> {
        self.expect_state(&[EngineState::Idle], "initialize")?;

        self.started = Instant::now();
        self.log = self.state_manager.load_previous().await;
        self.log.begin_run(self.run_id, Utc::now());

        match self.prepare(params).await {
            Ok(()) => {
                self.state = EngineState::Initialized;
                tracing::info!(
                    run_id = %self.run_id,
                    locales = ?self.locales().iter().map(Locale::as_str).collect::<Vec<_>>(),
                    chunk_size = self.config.sync.chunk_size,
                    total = self.total_count(),
                    "Sync engine initialized"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(run_id = %self.run_id, error = %e, "Sync engine failed to initialize");
                self.failure = Some(failure_message(&e));
                self.state = EngineState::Failed;
                Err(e)
            }
        }
    }

    async fn prepare(&mut self, params: &JobParameters) -> Result<()> {
        let routes = resolve_routes(&self.config, params.locale.as_deref()).await?;
        let accumulator = ChunkAccumulator::new(self.config.sync.chunk_size)?;
        let dispatcher = BatchDispatcher::new(Arc::clone(&self.sink), routes)
            .with_mode(self.config.sync.dispatch_mode, self.config.sync.max_concurrency);
        let locales = dispatcher.locales();

        tracing::debug!(catalog = %self.catalog.describe(), "Opening catalog");
        let cursor = self.catalog.open().await?;
        self.cursor = Some(CursorGuard::new(cursor));

        self.run = Some(ActiveRun {
            dispatcher,
            accumulator,
            locales,
        });
        Ok(())
    }

    /// Records the cursor will yield; for progress reporting only
    pub fn total_count(&self) -> u64 {
        self.cursor.as_ref().map(CursorGuard::count).unwrap_or(0)
    }

    /// Pull the next record, or `None` at end of input
    ///
    /// # Errors
    ///
    /// Returns an engine error when called out of order, or the catalog
    /// error of a failed read.
    pub async fn read(&mut self) -> Result<Option<Record>> {
        self.expect_state(
            &[
                EngineState::Initialized,
                EngineState::Reading,
                EngineState::Accumulating,
                EngineState::Dispatching,
            ],
            "read",
        )?;
        self.state = EngineState::Reading;

        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| SyncError::Engine("cursor is not open".to_string()))?;
        Ok(cursor.next_record().await?)
    }

    /// Build the document set for every in-scope locale
    ///
    /// Counts the record as processed exactly once.
    ///
    /// # Errors
    ///
    /// Returns an engine error when called out of order, or the transform
    /// error for the record.
    pub fn transform(&mut self, record: &Record) -> Result<LocalizedDocumentSet> {
        self.expect_state(&[EngineState::Reading], "transform")?;
        self.state = EngineState::Transforming;

        let run = self.active_run()?;
        let set = localize_record(self.transform.as_ref(), record, &run.locales)?;
        self.log.processed_records += 1;
        Ok(set)
    }

    /// Append a document set to the open chunk
    ///
    /// Returns `true` when the chunk is full and must be dispatched before
    /// the next append.
    ///
    /// # Errors
    ///
    /// Returns an engine error when called out of order or on a full chunk.
    pub fn accumulate(&mut self, set: LocalizedDocumentSet) -> Result<bool> {
        self.expect_state(&[EngineState::Transforming], "accumulate")?;
        self.state = EngineState::Accumulating;

        let run = self
            .run
            .as_mut()
            .ok_or_else(|| SyncError::Engine("no active run".to_string()))?;
        run.accumulator.append(set)
    }

    /// Dispatch the open chunk, full or short
    ///
    /// Returns `None` when there is nothing to send. Dispatch failures are
    /// counted in the run log and reported in the returned
    /// [`DispatchReport`], never returned as errors.
    ///
    /// # Errors
    ///
    /// Only for calls out of order.
    pub async fn dispatch(&mut self) -> Result<Option<DispatchReport>> {
        self.expect_state(
            &[
                EngineState::Initialized,
                EngineState::Reading,
                EngineState::Accumulating,
                EngineState::Dispatching,
            ],
            "dispatch",
        )?;
        self.state = EngineState::Dispatching;

        let run = self
            .run
            .as_mut()
            .ok_or_else(|| SyncError::Engine("no active run".to_string()))?;
        let Some(chunk) = run
            .accumulator
            .take_full()
            .or_else(|| run.accumulator.flush_remainder())
        else {
            return Ok(None);
        };

        let report = run.dispatcher.dispatch(&chunk, &mut self.log).await;
        Ok(Some(report))
    }

    /// Mark the run as failed with a reason, keeping the first reason given
    pub fn record_failure(&mut self, message: impl Into<String>) {
        if self.failure.is_none() {
            self.failure = Some(message.into());
        }
    }

    /// Close the cursor, stamp the run log and persist it
    ///
    /// `run_succeeded` is the host's verdict. The run is reported as failed
    /// when the host says so, when a failure was recorded, or when
    /// `sync.fail_on_dispatch_errors` is set and any record failed to send.
    ///
    /// # Errors
    ///
    /// Returns an engine error on a second call, or the storage error if
    /// the run log cannot be written. The cursor is released in both cases.
    pub async fn finalize(&mut self, run_succeeded: bool) -> Result<RunLog> {
        if self.finalized {
            return Err(SyncError::Engine("engine already finalized".to_string()));
        }
        self.finalized = true;
        self.state = EngineState::Finalizing;

        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }

        if let Some(run) = self.run.as_ref() {
            if !run.accumulator.is_empty() {
                tracing::warn!(
                    records = run.accumulator.len(),
                    "Finalizing with records that were never dispatched"
                );
            }
        }

        if self.config.sync.fail_on_dispatch_errors && self.log.failed_records > 0 {
            self.record_failure(format!(
                "{} records failed to send",
                self.log.failed_records
            ));
        }

        let succeeded = run_succeeded && self.failure.is_none();
        self.log.finish(succeeded, self.failure.as_deref(), Utc::now());
        log_run_summary!(&self.log, self.started.elapsed());

        if let Err(e) = self.state_manager.persist(&self.log).await {
            self.state = EngineState::Failed;
            return Err(e);
        }

        self.state = if succeeded {
            EngineState::Done
        } else {
            EngineState::Failed
        };
        Ok(self.log.clone())
    }

    fn active_run(&self) -> Result<&ActiveRun> {
        self.run
            .as_ref()
            .ok_or_else(|| SyncError::Engine("no active run".to_string()))
    }

    fn expect_state(&self, allowed: &[EngineState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SyncError::Engine(format!(
                "cannot {operation} while {}",
                self.state
            )))
        }
    }
}

/// Message stored in the run log for an error
pub(crate) fn failure_message(error: &SyncError) -> String {
    match error {
        SyncError::Configuration(message) => message.clone(),
        other => other.to_string(),
    }
}
