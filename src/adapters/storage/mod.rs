//! Run log persistence backends
//!
//! - [`FileRunLogStore`] - JSON file per log name, replaced atomically
//! - [`MemoryRunLogStore`] - process-local map

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileRunLogStore;
pub use memory::MemoryRunLogStore;
pub use traits::RunLogStore;
