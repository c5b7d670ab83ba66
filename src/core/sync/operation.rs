//! Wire operations for the indexing API
//!
//! An [`Operation`] is one write instruction inside a batch request. Its
//! body is the document with the identifier field renamed to `objectID`.

use crate::domain::{LocalizedDocument, Result, SyncError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field in operation bodies
pub const OBJECT_ID_FIELD: &str = "objectID";

/// Write verb understood by the indexing API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Add or replace the object
    AddObject,
    /// Replace an existing object
    UpdateObject,
    /// Remove the object
    DeleteObject,
}

/// One encoded write instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Write verb
    pub action: Action,

    /// Document fields with `objectID` in place of the identifier field
    pub body: Map<String, Value>,
}

impl Operation {
    /// Encodes a document into an operation
    ///
    /// Every field except the identifier field is copied verbatim, then
    /// `objectID` is set to the identifier value.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedDocument`] when the document has no
    /// (non-null) identifier.
    pub fn encode(action: Action, document: &LocalizedDocument) -> Result<Self> {
        let identifier_field = document.identifier_field();
        let identifier = document.identifier().cloned().ok_or_else(|| {
            SyncError::MalformedDocument(format!(
                "document has no '{identifier_field}' identifier"
            ))
        })?;

        let mut body: Map<String, Value> = document
            .fields()
            .iter()
            .filter(|(name, _)| name.as_str() != identifier_field)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        body.insert(OBJECT_ID_FIELD.to_string(), identifier);

        Ok(Self { action, body })
    }

    /// The `objectID` carried by this operation
    pub fn object_id(&self) -> Option<&Value> {
        self.body.get(OBJECT_ID_FIELD)
    }
}

/// Request body shared by the batch and push endpoints
#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    /// Operations in send order
    pub requests: &'a [Operation],
}
