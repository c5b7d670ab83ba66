//! Catalog sources
//!
//! - [`JsonlCatalog`] - newline-delimited JSON product export on disk
//! - [`MemoryCatalog`] - fixed list of records
//! - [`ProductFilter`] / [`IncludeAll`] - full-scan inclusion filters

pub mod filter;
pub mod jsonl;
pub mod memory;
pub mod traits;

pub use filter::{IncludeAll, ProductFilter, RecordFilter};
pub use jsonl::{JsonlCatalog, JsonlCursor};
pub use memory::{MemoryCatalog, MemoryCursor};
pub use traits::{CatalogSource, CursorGuard, RecordCursor};
