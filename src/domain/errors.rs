//! Domain error types
//!
//! This module defines the error hierarchy for catalog-sync.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main catalog-sync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors (disabled feature, missing mapping, bad parameter)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Catalog cursor errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Indexing service errors
    #[error("Indexing error: {0}")]
    Indexing(#[from] IndexingError),

    /// A document could not be encoded into an operation
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Transformation errors
    #[error("Transform error: {0}")]
    Transform(String),

    /// Engine lifecycle errors (operation called in the wrong state)
    #[error("Engine error: {0}")]
    Engine(String),

    /// Run log persistence errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Whether this error belongs to the configuration class that aborts a run before reading
    pub fn is_configuration(&self) -> bool {
        matches!(self, SyncError::Configuration(_))
    }
}

/// Catalog-specific errors
///
/// Errors raised by the record cursor. Close failures are reported
/// separately so they can be logged without masking the run outcome.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to open the catalog source
    #[error("Failed to open catalog: {0}")]
    OpenFailed(String),

    /// Failed to read the next record
    #[error("Failed to read record: {0}")]
    ReadFailed(String),

    /// A record could not be parsed
    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// Failed to release the cursor
    #[error("Failed to close catalog cursor: {0}")]
    CloseFailed(String),
}

/// Indexing service errors
///
/// Errors that occur when talking to the search or ingestion API.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum IndexingError {
    /// Failed to reach the service
    #[error("Failed to connect to indexing service: {0}")]
    ConnectionFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// No target is configured for a locale
    #[error("No index target configured for locale {0}")]
    MissingTarget(String),

    /// The client cannot route to this kind of target
    #[error("Unsupported target for this client: {0}")]
    UnsupportedTarget(String),
}

impl IndexingError {
    /// Maps an HTTP status and body onto the matching error variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            IndexingError::ServerError { status, message }
        } else {
            IndexingError::ClientError { status, message }
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Missing Indexing configuration".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing Indexing configuration"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_catalog_error_conversion() {
        let catalog_err = CatalogError::ReadFailed("disk gone".to_string());
        let err: SyncError = catalog_err.into();
        assert!(matches!(err, SyncError::Catalog(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_indexing_error_from_status() {
        assert!(matches!(
            IndexingError::from_status(503, "unavailable"),
            IndexingError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            IndexingError::from_status(400, "bad request"),
            IndexingError::ClientError { status: 400, .. }
        ));
    }

    #[test]
    fn test_invalid_record_display() {
        let err = CatalogError::InvalidRecord {
            line: 12,
            message: "expected object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid record at line 12: expected object"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SyncError = toml_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("TOML parse error"));
    }
}
