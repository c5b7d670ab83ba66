//! Indexing service clients
//!
//! - [`SearchIndexClient`] - `POST {base}{index}/batch`
//! - [`IngestionClient`] - `POST {base}tasks/{task}/push`
//! - [`DryRunSink`] - no network, logs only
//! - [`RecordingSink`] - in-memory capture with injectable failures

pub mod dry_run;
pub mod factory;
pub mod http;
pub mod ingestion;
pub mod recording;
pub mod search;
pub mod traits;

pub use dry_run::DryRunSink;
pub use factory::create_batch_sink;
pub use ingestion::IngestionClient;
pub use recording::{RecordedBatch, RecordingSink};
pub use search::SearchIndexClient;
pub use traits::{BatchReceipt, BatchSink, SendStatus};
