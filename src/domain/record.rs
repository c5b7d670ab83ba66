//! Catalog record model
//!
//! A [`Record`] is one product as delivered by the catalog cursor. The
//! sync pipeline never mutates it; localizers read from it to build
//! per-locale documents.
//!
//! A record whose identifier is missing or unusable is still a record: it
//! counts as processed and its documents are dropped when operations are
//! encoded.

use super::ids::ProductId;
use serde_json::{Map, Value};

/// Label used in logs for records without a usable identifier
pub const UNIDENTIFIED: &str = "<unidentified>";

/// One source catalog item
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Product identifier, `None` when the source value was missing or unusable
    pub id: Option<ProductId>,

    /// Raw product attributes, including the identifier field
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Create a record from an identifier and attribute map
    pub fn new(id: ProductId, attributes: Map<String, Value>) -> Self {
        Self {
            id: Some(id),
            attributes,
        }
    }

    /// Build a record from a JSON object, reading the identifier from `id_field`
    ///
    /// Numeric identifiers are accepted and stored in their string form.
    /// A missing, empty or structured identifier leaves `id` as `None`.
    ///
    /// # Errors
    ///
    /// Returns a message if the value is not a JSON object.
    pub fn from_value(value: Value, id_field: &str) -> Result<Self, String> {
        let attributes = match value {
            Value::Object(map) => map,
            other => return Err(format!("expected a JSON object, got {}", type_name(&other))),
        };

        let id = match attributes.get(id_field) {
            Some(Value::String(s)) => ProductId::new(s.clone()).ok(),
            Some(Value::Number(n)) => ProductId::new(n.to_string()).ok(),
            _ => None,
        };

        Ok(Self { id, attributes })
    }

    /// Identifier for log output
    pub fn label(&self) -> &str {
        self.id.as_ref().map_or(UNIDENTIFIED, ProductId::as_str)
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Reads a boolean flag, treating a missing attribute as `default`
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.attributes
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
