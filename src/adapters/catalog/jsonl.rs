//! Newline-delimited JSON catalog export
//!
//! One product object per line. Blank lines are ignored. The record count
//! is taken by a first pass over the file when a cursor is opened.
//!
//! A line that is not a JSON object is a read error. A product without a
//! usable identifier is still returned; it is skipped at encoding time.

use super::traits::{CatalogSource, RecordCursor};
use crate::domain::{CatalogError, Record};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Catalog read from a `.jsonl` product export
#[derive(Debug, Clone)]
pub struct JsonlCatalog {
    path: PathBuf,
    id_field: String,
}

impl JsonlCatalog {
    /// Create a catalog reading `path`, taking identifiers from `id_field`
    pub fn new(path: impl Into<PathBuf>, id_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id_field: id_field.into(),
        }
    }

    /// Path of the export file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open_lines(&self) -> Result<Lines<BufReader<File>>, CatalogError> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| CatalogError::OpenFailed(format!("{}: {e}", self.path.display())))?;
        Ok(BufReader::new(file).lines())
    }
}

#[async_trait]
impl CatalogSource for JsonlCatalog {
    fn describe(&self) -> String {
        format!("jsonl catalog {}", self.path.display())
    }

    async fn open(&self) -> Result<Box<dyn RecordCursor>, CatalogError> {
        let mut counting = self.open_lines().await?;
        let mut count = 0u64;
        while let Some(line) = counting
            .next_line()
            .await
            .map_err(|e| CatalogError::ReadFailed(e.to_string()))?
        {
            if !line.trim().is_empty() {
                count += 1;
            }
        }

        tracing::debug!(path = %self.path.display(), count, "Opened catalog export");

        Ok(Box::new(JsonlCursor {
            lines: Some(self.open_lines().await?),
            id_field: self.id_field.clone(),
            line_number: 0,
            count,
        }))
    }
}

/// Streaming cursor over a `.jsonl` export
pub struct JsonlCursor {
    lines: Option<Lines<BufReader<File>>>,
    id_field: String,
    line_number: usize,
    count: u64,
}

#[async_trait]
impl RecordCursor for JsonlCursor {
    fn count(&self) -> u64 {
        self.count
    }

    async fn next_record(&mut self) -> Result<Option<Record>, CatalogError> {
        let Some(lines) = self.lines.as_mut() else {
            return Err(CatalogError::ReadFailed("cursor already closed".to_string()));
        };

        loop {
            let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| CatalogError::ReadFailed(e.to_string()))?
            else {
                return Ok(None);
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            let value: serde_json::Value =
                serde_json::from_str(&line).map_err(|e| CatalogError::InvalidRecord {
                    line: self.line_number,
                    message: e.to_string(),
                })?;

            let record = Record::from_value(value, &self.id_field).map_err(|message| {
                CatalogError::InvalidRecord {
                    line: self.line_number,
                    message,
                }
            })?;
            if record.id.is_none() {
                tracing::warn!(
                    line = self.line_number,
                    id_field = %self.id_field,
                    "Product has no usable identifier, its documents will be skipped"
                );
            }
            return Ok(Some(record));
        }
    }

    fn close(&mut self) -> Result<(), CatalogError> {
        match self.lines.take() {
            Some(_) => Ok(()),
            None => Err(CatalogError::CloseFailed("cursor already closed".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn export(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_jsonl_cursor_reads_records() {
        let file = export(
            "{\"id\": \"P1\", \"name\": \"Shirt\"}\n\n{\"id\": \"P2\", \"name\": \"Cap\"}\n",
        );
        let catalog = JsonlCatalog::new(file.path(), "id");
        let mut cursor = catalog.open().await.unwrap();

        assert_eq!(cursor.count(), 2);
        assert_eq!(cursor.next_record().await.unwrap().unwrap().label(), "P1");
        assert_eq!(cursor.next_record().await.unwrap().unwrap().label(), "P2");
        assert!(cursor.next_record().await.unwrap().is_none());

        cursor.close().unwrap();
        assert!(cursor.close().is_err());
        assert!(cursor.next_record().await.is_err());
    }

    #[tokio::test]
    async fn test_jsonl_invalid_line_reports_line_number() {
        let file = export("{\"id\": \"P1\"}\n{broken\n");
        let catalog = JsonlCatalog::new(file.path(), "id");
        let mut cursor = catalog.open().await.unwrap();

        cursor.next_record().await.unwrap();
        let err = cursor.next_record().await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_jsonl_missing_identifier() {
        let file = export("{\"name\": \"No id\"}\n");
        let catalog = JsonlCatalog::new(file.path(), "id");
        let mut cursor = catalog.open().await.unwrap();

        let record = cursor.next_record().await.unwrap().unwrap();
        assert!(record.id.is_none());
        assert_eq!(record.get("name"), Some(&serde_json::json!("No id")));
    }

    #[tokio::test]
    async fn test_jsonl_non_object_line() {
        let file = export("[1, 2, 3]\n");
        let catalog = JsonlCatalog::new(file.path(), "id");
        let mut cursor = catalog.open().await.unwrap();
        assert!(matches!(
            cursor.next_record().await,
            Err(CatalogError::InvalidRecord { line: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_jsonl_missing_file() {
        let catalog = JsonlCatalog::new("/nonexistent/products.jsonl", "id");
        assert!(matches!(
            catalog.open().await,
            Err(CatalogError::OpenFailed(_))
        ));
    }
}
