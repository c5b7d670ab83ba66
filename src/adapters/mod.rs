//! External system integrations for catalog-sync.
//!
//! - [`catalog`] - record cursors over product exports
//! - [`indexing`] - search and ingestion API clients
//! - [`storage`] - run log persistence
//!
//! Each concern sits behind a trait so the sync engine can be driven with
//! in-memory implementations:
//!
//! ```rust
//! use catalog_sync::adapters::catalog::{CatalogSource, MemoryCatalog, RecordCursor};
//! use catalog_sync::domain::{ProductId, Record};
//! use serde_json::Map;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = MemoryCatalog::new(vec![Record::new(ProductId::new("P1")?, Map::new())]);
//! let mut cursor = catalog.open().await?;
//! assert_eq!(cursor.count(), 1);
//! cursor.close()?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod indexing;
pub mod storage;
