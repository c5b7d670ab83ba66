//! Domain models and types for catalog-sync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Locale`], [`ProductId`], [`IndexTarget`])
//! - **Domain models** ([`Record`], [`LocalizedDocument`], [`LocalizedDocumentSet`])
//! - **Error types** ([`SyncError`], [`CatalogError`], [`IndexingError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Locales are validated newtypes, so an index name can never be passed where
//! a locale is expected:
//!
//! ```rust
//! use catalog_sync::domain::{IndexTarget, Locale};
//! use std::str::FromStr;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let locale = Locale::from_str("en_US")?;
//! let target = IndexTarget::product_index("shop", &locale);
//! assert_eq!(target.as_str(), "shop__products__en_US");
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{LocalizedDocument, LocalizedDocumentSet, DEFAULT_IDENTIFIER_FIELD};
pub use errors::{CatalogError, IndexingError, SyncError};
pub use ids::{IndexTarget, Locale, ProductId};
pub use record::Record;
pub use result::Result;
