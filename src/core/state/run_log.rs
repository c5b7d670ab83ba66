//! Run log model
//!
//! The run log is the only state that outlives a run. It is loaded at
//! start, its counters are reset and then updated additively, and it is
//! written back once when the run is finalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message stored when a run fails without a more specific reason
pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred during the job. Please see the error log for more details.";

/// Counters and outcome of the last synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunLog {
    /// Records read and transformed
    pub processed_records: u64,

    /// Chunk dispatch invocations, counted once per chunk
    pub sent_chunks: u64,

    /// Operations accepted by the indexing service
    pub sent_records: u64,

    /// Failed (chunk, locale) calls
    pub failed_chunks: u64,

    /// Operations carried by failed calls
    pub failed_records: u64,

    /// When processing finished
    pub processed_date: Option<DateTime<Utc>>,

    /// Whether processing failed
    pub processed_error: bool,

    /// Reason for a processing failure
    pub processed_error_message: String,

    /// When sending finished
    pub send_date: Option<DateTime<Utc>>,

    /// Whether sending failed
    pub send_error: bool,

    /// Reason for a sending failure
    pub send_error_message: String,

    /// Identifier of the run that wrote this log
    pub run_id: Option<Uuid>,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl RunLog {
    /// Starts a new run on top of the previous log
    ///
    /// Counters go back to zero. Dates and error fields of the previous run
    /// stay until [`RunLog::finish`] overwrites them.
    pub fn begin_run(&mut self, run_id: Uuid, started_at: DateTime<Utc>) {
        self.processed_records = 0;
        self.sent_chunks = 0;
        self.sent_records = 0;
        self.failed_chunks = 0;
        self.failed_records = 0;
        self.duration_ms = 0;
        self.run_id = Some(run_id);
        self.started_at = Some(started_at);
    }

    /// Counts one successful (chunk, locale) call
    pub fn record_sent(&mut self, operations: usize) {
        self.sent_records += operations as u64;
    }

    /// Counts one failed (chunk, locale) call
    pub fn record_failed(&mut self, operations: usize) {
        self.failed_chunks += 1;
        self.failed_records += operations as u64;
    }

    /// Stamps dates and maps the run outcome onto the error fields
    ///
    /// A failed run stores `message`, or the generic message when none is
    /// given. A successful run clears both error messages.
    pub fn finish(&mut self, succeeded: bool, message: Option<&str>, now: DateTime<Utc>) {
        let message = if succeeded {
            String::new()
        } else {
            message.unwrap_or(GENERIC_ERROR_MESSAGE).to_string()
        };

        self.processed_date = Some(now);
        self.processed_error = !succeeded;
        self.processed_error_message = message.clone();
        self.send_date = Some(now);
        self.send_error = !succeeded;
        self.send_error_message = message;

        if let Some(started) = self.started_at {
            self.duration_ms = (now - started).num_milliseconds().max(0) as u64;
        }
    }

    /// Whether every processed record ended up sent or failed
    ///
    /// Holds for single-locale runs when every chunk was dispatched once.
    pub fn is_balanced(&self) -> bool {
        self.sent_records + self.failed_records == self.processed_records
    }

    /// Whether the run completed without any failed call
    pub fn is_clean(&self) -> bool {
        !self.processed_error && !self.send_error && self.failed_chunks == 0
    }
}
