//! Localized document models
//!
//! A [`LocalizedDocument`] is the locale-specific projection of one record.
//! A [`LocalizedDocumentSet`] groups every locale's document for the same
//! record, and is the unit the chunk accumulator stores: one slot per
//! record no matter how many locales are in scope.

use super::ids::{Locale, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default name of the identifier field in transformed documents
pub const DEFAULT_IDENTIFIER_FIELD: &str = "id";

/// Field map for one (record, locale) pair plus the name of its identifier field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedDocument {
    identifier_field: String,
    fields: Map<String, Value>,
}

impl LocalizedDocument {
    /// Create a document using the default `id` identifier field
    pub fn new(fields: Map<String, Value>) -> Self {
        Self::with_identifier_field(DEFAULT_IDENTIFIER_FIELD, fields)
    }

    /// Create a document with a custom identifier field name
    pub fn with_identifier_field(identifier_field: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            identifier_field: identifier_field.into(),
            fields,
        }
    }

    /// Name of the identifier field
    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// Identifier value, if present and not null
    pub fn identifier(&self) -> Option<&Value> {
        self.fields
            .get(&self.identifier_field)
            .filter(|value| !value.is_null())
    }

    /// Look up a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// All fields, identifier included
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of fields, identifier included
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Every locale's document for one record
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedDocumentSet {
    /// Source record identifier
    pub record_id: Option<ProductId>,

    documents: BTreeMap<Locale, LocalizedDocument>,
}

impl LocalizedDocumentSet {
    /// Create an empty set for a record
    pub fn new(record_id: impl Into<Option<ProductId>>) -> Self {
        Self {
            record_id: record_id.into(),
            documents: BTreeMap::new(),
        }
    }

    /// Record identifier for log output
    pub fn label(&self) -> &str {
        self.record_id
            .as_ref()
            .map_or(super::record::UNIDENTIFIED, ProductId::as_str)
    }

    /// Add the document for a locale, replacing any previous one
    pub fn insert(&mut self, locale: Locale, document: LocalizedDocument) {
        self.documents.insert(locale, document);
    }

    /// Document for a locale
    pub fn get(&self, locale: &Locale) -> Option<&LocalizedDocument> {
        self.documents.get(locale)
    }

    /// Locales present in this set
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.documents.keys()
    }

    /// Number of locales present
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no locale produced a document
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
