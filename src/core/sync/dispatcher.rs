//! Batch dispatch
//!
//! Turns one chunk into one call per in-scope locale. Failed calls are
//! counted and logged, never propagated: a chunk may end up delivered for
//! some locales and not for others.

use super::chunk::Chunk;
use super::operation::{Action, Operation};
use super::targets::LocaleRoute;
use crate::adapters::indexing::{BatchSink, SendStatus};
use crate::config::DispatchMode;
use crate::core::state::RunLog;
use crate::domain::{IndexTarget, Locale};
use crate::{log_chunk_dispatched, log_locale_failure};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Result of one (chunk, locale) call
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleOutcome {
    /// Locale of the call
    pub locale: Locale,

    /// Where the call went
    pub target: IndexTarget,

    /// Operations carried by the call
    pub operations: usize,

    /// Documents left out because they could not be encoded
    pub skipped: usize,

    /// Call outcome
    pub status: SendStatus,
}

/// Per-locale outcomes of one chunk dispatch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Sequence number of the chunk
    pub chunk: u64,

    /// Records in the chunk
    pub records: usize,

    /// Outcomes in route order
    pub outcomes: Vec<LocaleOutcome>,
}

impl DispatchReport {
    /// Whether every locale call succeeded
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.ok)
    }

    /// Number of failed locale calls
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.error).count()
    }
}

/// Sends chunks to the indexing service, one call per locale
pub struct BatchDispatcher {
    sink: Arc<dyn BatchSink>,
    routes: Vec<LocaleRoute>,
    action: Action,
    mode: DispatchMode,
    max_concurrency: usize,
}

impl BatchDispatcher {
    /// Sequential dispatcher sending `addObject` operations
    pub fn new(sink: Arc<dyn BatchSink>, routes: Vec<LocaleRoute>) -> Self {
        Self {
            sink,
            routes,
            action: Action::AddObject,
            mode: DispatchMode::Sequential,
            max_concurrency: 1,
        }
    }

    /// Choose sequential or bounded parallel dispatch
    pub fn with_mode(mut self, mode: DispatchMode, max_concurrency: usize) -> Self {
        self.mode = mode;
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Override the action written for every operation
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Routes in dispatch order
    pub fn routes(&self) -> &[LocaleRoute] {
        &self.routes
    }

    /// Locales in dispatch order
    pub fn locales(&self) -> Vec<Locale> {
        self.routes.iter().map(|r| r.locale.clone()).collect()
    }

    /// Dispatch a chunk and apply the outcome to the run log
    ///
    /// `sent_chunks` goes up once per call to this method. Each failed
    /// locale adds one failed chunk and its operations to
    /// `failed_records`; each successful locale adds its operations to
    /// `sent_records`. Counters are applied in route order in both modes.
    pub async fn dispatch(&self, chunk: &Chunk, log: &mut RunLog) -> DispatchReport {
        let outcomes = match self.mode {
            DispatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(self.routes.len());
                for route in &self.routes {
                    outcomes.push(self.send_locale(chunk, route).await);
                }
                outcomes
            }
            DispatchMode::Parallel => {
                stream::iter(self.routes.iter().map(|route| self.send_locale(chunk, route)))
                    .buffered(self.max_concurrency)
                    .collect::<Vec<_>>()
                    .await
            }
        };

        log.sent_chunks += 1;
        for outcome in &outcomes {
            if outcome.status.ok {
                log.record_sent(outcome.operations);
            } else {
                log.record_failed(outcome.operations);
            }
        }

        DispatchReport {
            chunk: chunk.index(),
            records: chunk.len(),
            outcomes,
        }
    }

    fn build_operations(&self, chunk: &Chunk, locale: &Locale) -> (Vec<Operation>, usize) {
        let mut operations = Vec::with_capacity(chunk.len());
        let mut skipped = 0;

        for set in chunk.items() {
            let Some(document) = set.get(locale) else {
                skipped += 1;
                tracing::warn!(record = set.label(), locale = %locale, "No document for locale");
                continue;
            };
            match Operation::encode(self.action, document) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        record = set.label(),
                        locale = %locale,
                        error = %e,
                        "Skipping document"
                    );
                }
            }
        }

        (operations, skipped)
    }

    async fn send_locale(&self, chunk: &Chunk, route: &LocaleRoute) -> LocaleOutcome {
        let (operations, skipped) = self.build_operations(chunk, &route.locale);

        let status = if operations.is_empty() {
            tracing::debug!(chunk = chunk.index(), locale = %route.locale, "Nothing to send");
            SendStatus::success("")
        } else {
            let result = self.sink.send_batch(&route.target, &operations).await;
            let status = SendStatus::from(&result);
            if status.ok {
                log_chunk_dispatched!(chunk.index(), route.locale, route.target, operations.len());
            } else {
                log_locale_failure!(
                    chunk.index(),
                    route.locale,
                    route.target,
                    operations.len(),
                    status.message
                );
            }
            status
        };

        LocaleOutcome {
            locale: route.locale.clone(),
            target: route.target.clone(),
            operations: operations.len(),
            skipped,
            status,
        }
    }
}
