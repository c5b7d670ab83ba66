//! Chunked synchronization pipeline
//!
//! - [`operation`] - batch operation encoding
//! - [`chunk`] - bounded accumulation of document sets
//! - [`targets`] - locale → index/task resolution
//! - [`dispatcher`] - per-locale batch dispatch and counting
//! - [`engine`] - host-stepped engine state machine
//! - [`runner`] - host loop with graceful shutdown
//! - [`full_scan`] - self-driving scan with an inclusion filter

pub mod chunk;
pub mod dispatcher;
pub mod engine;
pub mod full_scan;
pub mod operation;
pub mod runner;
pub mod targets;

pub use chunk::{Chunk, ChunkAccumulator};
pub use dispatcher::{BatchDispatcher, DispatchReport, LocaleOutcome};
pub use engine::{EngineState, JobParameters, SyncEngine};
pub use full_scan::{FullScanJob, PhaseTimings, FULL_SCAN_CHUNK_SIZE};
pub use operation::{Action, BatchRequest, Operation, OBJECT_ID_FIELD};
pub use runner::{JobRunner, RunOutcome, INTERRUPTED_MESSAGE};
pub use targets::{
    resolve_routes, LocaleRoute, TargetResolver, TaskMapping, DISABLED_MESSAGE,
    MISSING_CONFIG_MESSAGE,
};
