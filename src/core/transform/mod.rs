//! Record transformation
//!
//! A [`LocalizedTransform`] projects one record onto one locale. The engine
//! calls it once per in-scope locale and stores the results together as a
//! [`LocalizedDocumentSet`].
//!
//! ```
//! use catalog_sync::core::transform::{localize_record, AttributeLocalizer};
//! use catalog_sync::domain::{Locale, Record};
//! use serde_json::json;
//! use std::str::FromStr;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let record = Record::from_value(
//!     json!({"id": "P1", "name": {"default": "Shirt", "fr_FR": "Chemise"}}),
//!     "id",
//! )?;
//! let locales = vec![Locale::from_str("en_US")?, Locale::from_str("fr_FR")?];
//!
//! let set = localize_record(&AttributeLocalizer::new("id"), &record, &locales)?;
//! assert_eq!(set.get(&locales[1]).unwrap().get("name"), Some(&json!("Chemise")));
//! assert_eq!(set.get(&locales[0]).unwrap().get("name"), Some(&json!("Shirt")));
//! # Ok(())
//! # }
//! ```

pub mod localize;

pub use localize::AttributeLocalizer;

use crate::domain::{Locale, LocalizedDocument, LocalizedDocumentSet, Record, Result};

/// Produces the locale-specific document for a record
pub trait LocalizedTransform: Send + Sync {
    /// Build the document for `locale`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SyncError::Transform`] when the record
    /// cannot be projected.
    fn localize(&self, record: &Record, locale: &Locale) -> Result<LocalizedDocument>;
}

/// Build the document set of a record for every locale, in order
///
/// # Errors
///
/// Fails on the first locale the transform rejects.
pub fn localize_record(
    transform: &dyn LocalizedTransform,
    record: &Record,
    locales: &[Locale],
) -> Result<LocalizedDocumentSet> {
    let mut set = LocalizedDocumentSet::new(record.id.clone());
    for locale in locales {
        set.insert(locale.clone(), transform.localize(record, locale)?);
    }
    Ok(set)
}
