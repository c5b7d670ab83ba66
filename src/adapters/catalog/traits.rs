//! Catalog cursor abstraction
//!
//! A [`CatalogSource`] opens a [`RecordCursor`] over the products of one
//! run. The cursor is owned by exactly one reader and must be closed
//! exactly once; [`CursorGuard`] enforces that on every exit path.

use crate::domain::{CatalogError, Record};
use async_trait::async_trait;

/// Forward-only cursor over catalog records
#[async_trait]
pub trait RecordCursor: Send {
    /// Number of records the cursor will yield, known when it was opened
    fn count(&self) -> u64;

    /// Next record, or `None` at end of input
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or parsed.
    async fn next_record(&mut self) -> Result<Option<Record>, CatalogError>;

    /// Release the underlying resource
    ///
    /// # Errors
    ///
    /// Returns an error if the resource could not be released cleanly.
    fn close(&mut self) -> Result<(), CatalogError>;
}

/// Something that can open record cursors
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human readable description for logs
    fn describe(&self) -> String;

    /// Open a new cursor positioned before the first record
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OpenFailed`] if the source is unavailable.
    async fn open(&self) -> Result<Box<dyn RecordCursor>, CatalogError>;
}

/// Scoped owner of a cursor that closes it exactly once
///
/// [`CursorGuard::close`] releases the cursor explicitly; dropping an open
/// guard releases it too. Close failures are logged and never propagated.
pub struct CursorGuard {
    cursor: Option<Box<dyn RecordCursor>>,
    count: u64,
}

impl CursorGuard {
    /// Take ownership of an open cursor
    pub fn new(cursor: Box<dyn RecordCursor>) -> Self {
        let count = cursor.count();
        Self {
            cursor: Some(cursor),
            count,
        }
    }

    /// Record count reported when the cursor was opened
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether the cursor is still open
    pub fn is_open(&self) -> bool {
        self.cursor.is_some()
    }

    /// Read the next record
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor was closed or the read fails.
    pub async fn next_record(&mut self) -> Result<Option<Record>, CatalogError> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_record().await,
            None => Err(CatalogError::ReadFailed("cursor already closed".to_string())),
        }
    }

    /// Close the cursor if it is still open
    ///
    /// Returns `true` when this call released the cursor.
    pub fn close(&mut self) -> bool {
        let Some(mut cursor) = self.cursor.take() else {
            return false;
        };
        if let Err(e) = cursor.close() {
            tracing::warn!(error = %e, "Failed to close catalog cursor");
        }
        true
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if self.close() {
            tracing::debug!("Catalog cursor released on drop");
        }
    }
}
