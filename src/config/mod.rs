//! Configuration management for catalog-sync.
//!
//! Configuration is a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CATALOG_SYNC_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Per-section validation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use catalog_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("catalog-sync.toml")?;
//! println!("Indexing URL: {}", config.indexing.base_url);
//! println!("Locales: {}", config.site.allowed_locales.join(", "));
//! # Ok(())
//! # }
//! ```
//!
//! # Sections
//!
//! - [`ApplicationConfig`] - log level and dry run
//! - [`SiteConfig`] - allowed locales in dispatch order
//! - [`CatalogConfig`] - product export location
//! - [`IndexingConfig`] - search or ingestion API, credentials, locale → task mapping
//! - [`SyncConfig`] - chunk size, mode, dispatch mode
//! - [`StateConfig`] - run log location
//! - [`LoggingConfig`] - log files
//!
//! # Example Configuration
//!
//! ```toml
//! [site]
//! allowed_locales = ["en_US", "fr_FR"]
//!
//! [catalog]
//! path = "/data/exports/products.jsonl"
//!
//! [indexing]
//! variant = "ingestion"
//! base_url = "https://data.us.example-indexing.com/api/1/"
//! application_id = "APP123"
//! api_key = "${CATALOG_SYNC_API_KEY}"
//! indexing_config = '{"locales": {"en_US": {"products": {"tasks": {"replace": "task-en"}}}}}'
//!
//! [sync]
//! chunk_size = 500
//! dispatch_mode = "sequential"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CatalogConfig, CatalogSyncConfig, DispatchMode, IndexVariant,
    IndexingConfig, LoggingConfig, SiteConfig, StateConfig, SyncConfig, SyncMode,
};
pub use secret::{secret_string, SecretString, SecretValue};
