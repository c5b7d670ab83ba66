//! Attribute localization
//!
//! Catalog exports carry localizable attributes as objects keyed by locale,
//! with an optional `default` entry:
//!
//! ```json
//! {"id": "P1", "name": {"default": "Shirt", "fr_FR": "Chemise"}, "price": 25}
//! ```
//!
//! For locale `fr_FR` this becomes `{"id": "P1", "name": "Chemise", "price": 25}`.
//! Objects without a `default` key or a key for the requested locale are
//! copied unchanged.

use super::LocalizedTransform;
use crate::domain::{Locale, LocalizedDocument, Record, Result};
use serde_json::{Map, Value};

/// Key holding the fallback value of a localized attribute
pub const DEFAULT_LOCALE_KEY: &str = "default";

/// Resolves localized attributes and applies an optional allow list
#[derive(Debug, Clone)]
pub struct AttributeLocalizer {
    id_field: String,
    attributes: Vec<String>,
}

impl AttributeLocalizer {
    /// Localizer that keeps every attribute
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            attributes: Vec::new(),
        }
    }

    /// Keep only these attributes (the identifier is always kept)
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    fn keeps(&self, name: &str) -> bool {
        self.attributes.is_empty() || name == self.id_field || self.attributes.iter().any(|a| a == name)
    }
}

fn resolve(value: &Value, locale: &Locale) -> Value {
    match value {
        Value::Object(map) if map.contains_key(locale.as_str()) || map.contains_key(DEFAULT_LOCALE_KEY) => map
            .get(locale.as_str())
            .filter(|v| !v.is_null())
            .or_else(|| map.get(DEFAULT_LOCALE_KEY))
            .cloned()
            .unwrap_or(Value::Null),
        other => other.clone(),
    }
}

impl LocalizedTransform for AttributeLocalizer {
    fn localize(&self, record: &Record, locale: &Locale) -> Result<LocalizedDocument> {
        // An unusable identifier must not reach the wire as an objectID
        let has_identifier = record.id.is_some();
        let fields: Map<String, Value> = record
            .attributes
            .iter()
            .filter(|(name, _)| self.keeps(name))
            .filter(|(name, _)| has_identifier || name.as_str() != self.id_field)
            .map(|(name, value)| (name.clone(), resolve(value, locale)))
            .collect();

        Ok(LocalizedDocument::with_identifier_field(
            self.id_field.clone(),
            fields,
        ))
    }
}
