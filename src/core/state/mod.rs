//! Run log state
//!
//! The [`RunLog`] model and the [`StateManager`] that loads it at run start
//! and persists it at run end.

pub mod manager;
pub mod run_log;

pub use manager::{StateManager, DEFAULT_LOG_NAME};
pub use run_log::{RunLog, GENERIC_ERROR_MESSAGE};
