//! In-memory catalog
//!
//! Serves a fixed list of records. Every opened cursor reports its close
//! calls to a shared counter so callers can check release discipline.

use super::traits::{CatalogSource, RecordCursor};
use crate::domain::{CatalogError, Record};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Catalog backed by a vector of records
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: Vec<Record>,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
    fail_read_at: Option<usize>,
}

impl MemoryCatalog {
    /// Create a catalog serving `records` in order
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Make cursor close report an error (the cursor is still released)
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Make the read of the record at `position` (0-based) fail
    pub fn failing_read_at(mut self, position: usize) -> Self {
        self.fail_read_at = Some(position);
        self
    }

    /// Total close calls across all cursors opened from this catalog
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    fn describe(&self) -> String {
        format!("memory catalog ({} records)", self.records.len())
    }

    async fn open(&self) -> Result<Box<dyn RecordCursor>, CatalogError> {
        Ok(Box::new(MemoryCursor {
            count: self.records.len() as u64,
            records: self.records.iter().cloned().collect(),
            position: 0,
            closes: Arc::clone(&self.closes),
            fail_close: self.fail_close,
            fail_read_at: self.fail_read_at,
        }))
    }
}

/// Cursor over an in-memory record queue
#[derive(Debug)]
pub struct MemoryCursor {
    count: u64,
    records: VecDeque<Record>,
    position: usize,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
    fail_read_at: Option<usize>,
}

#[async_trait]
impl RecordCursor for MemoryCursor {
    fn count(&self) -> u64 {
        self.count
    }

    async fn next_record(&mut self) -> Result<Option<Record>, CatalogError> {
        if self.fail_read_at == Some(self.position) {
            return Err(CatalogError::ReadFailed(format!(
                "simulated read failure at record {}",
                self.position
            )));
        }
        let record = self.records.pop_front();
        if record.is_some() {
            self.position += 1;
        }
        Ok(record)
    }

    fn close(&mut self) -> Result<(), CatalogError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.records.clear();
        if self.fail_close {
            return Err(CatalogError::CloseFailed("simulated close failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;
    use serde_json::Map;

    #[tokio::test]
    async fn test_memory_cursor_yields_in_order() {
        let records = vec![
            Record::new(ProductId::new("A").unwrap(), Map::new()),
            Record::new(ProductId::new("B").unwrap(), Map::new()),
        ];
        let catalog = MemoryCatalog::new(records);
        let mut cursor = catalog.open().await.unwrap();

        assert_eq!(cursor.count(), 2);
        assert_eq!(cursor.next_record().await.unwrap().unwrap().label(), "A");
        assert_eq!(cursor.next_record().await.unwrap().unwrap().label(), "B");
        assert!(cursor.next_record().await.unwrap().is_none());
        cursor.close().unwrap();
        assert_eq!(catalog.close_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_cursor_read_failure() {
        let records = vec![Record::new(ProductId::new("A").unwrap(), Map::new())];
        let catalog = MemoryCatalog::new(records).failing_read_at(1);
        let mut cursor = catalog.open().await.unwrap();

        assert!(cursor.next_record().await.unwrap().is_some());
        assert!(cursor.next_record().await.is_err());
    }
}
