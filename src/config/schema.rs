//! Configuration schema types
//!
//! This module defines the configuration structure for catalog-sync. Each
//! section validates itself; [`CatalogSyncConfig::validate`] runs them all.

use crate::config::SecretString;
use crate::domain::Locale;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Indexing API flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexVariant {
    /// Search batch API, one index per locale
    #[default]
    Search,
    /// Ingestion API, one task per locale
    Ingestion,
}

/// How records are pulled through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Host-stepped chunk engine
    #[default]
    Chunked,
    /// Single self-owned loop with inclusion filter and phase timings
    FullScan,
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "chunked" | "chunk" => Ok(Self::Chunked),
            "full_scan" | "fullscan" | "full" => Ok(Self::FullScan),
            _ => Err(format!(
                "Invalid sync mode: {s}. Expected 'chunked' or 'full_scan'"
            )),
        }
    }
}

/// How one chunk's locales are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One locale after another in configured order
    #[default]
    Sequential,
    /// Locales of a chunk sent concurrently, bounded by `max_concurrency`
    Parallel,
}

/// Main catalog-sync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Site locales
    pub site: SiteConfig,

    /// Catalog source
    pub catalog: CatalogConfig,

    /// Indexing service
    pub indexing: IndexingConfig,

    /// Sync engine settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Run log persistence
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CatalogSyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.site.validate()?;
        self.catalog.validate()?;
        self.indexing.validate()?;
        self.sync.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (don't send anything to the indexing service)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Site locale configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Locales allowed on the site, in dispatch order
    pub allowed_locales: Vec<String>,
}

impl SiteConfig {
    fn validate(&self) -> Result<(), String> {
        if self.allowed_locales.is_empty() {
            return Err("site.allowed_locales cannot be empty".to_string());
        }
        let mut seen = Vec::new();
        for locale in &self.allowed_locales {
            Locale::from_str(locale).map_err(|e| format!("site.allowed_locales: {e}"))?;
            if seen.contains(&locale) {
                return Err(format!("site.allowed_locales contains '{locale}' twice"));
            }
            seen.push(locale);
        }
        Ok(())
    }

    /// Allowed locales as validated values
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is not a valid locale.
    pub fn locales(&self) -> Result<Vec<Locale>, String> {
        self.allowed_locales
            .iter()
            .map(|l| Locale::from_str(l))
            .collect()
    }
}

/// Catalog source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the newline-delimited JSON product export
    pub path: String,

    /// Name of the identifier attribute in each product
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Include offline products in full scans
    #[serde(default)]
    pub include_offline: bool,
}

impl CatalogConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("catalog.path cannot be empty".to_string());
        }
        if self.id_field.trim().is_empty() {
            return Err("catalog.id_field cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Indexing service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Master switch; a disabled run fails during initialize
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Which API to talk to
    #[serde(default)]
    pub variant: IndexVariant,

    /// Base URL of the API, requests are appended to it
    pub base_url: String,

    /// Prefix for index names (`{prefix}__products__{locale}`)
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Application identifier sent with every request
    #[serde(default)]
    pub application_id: Option<String>,

    /// API key sent with every request
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Inline JSON locale → task mapping
    #[serde(default)]
    pub indexing_config: Option<String>,

    /// File holding the JSON locale → task mapping
    #[serde(default)]
    pub indexing_config_path: Option<String>,
}

impl IndexingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("indexing.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("indexing.base_url is not a valid URL: {e}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("indexing.base_url must start with http:// or https://".to_string());
        }

        if self.index_prefix.trim().is_empty() {
            return Err("indexing.index_prefix cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 600 {
            return Err(format!(
                "indexing.timeout_seconds must be between 1 and 600, got {}",
                self.timeout_seconds
            ));
        }

        if self.indexing_config.is_some() && self.indexing_config_path.is_some() {
            return Err(
                "indexing.indexing_config and indexing.indexing_config_path are mutually exclusive"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            variant: IndexVariant::default(),
            base_url: "http://localhost:8080/1/indexes/".to_string(),
            index_prefix: default_index_prefix(),
            application_id: None,
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            indexing_config: None,
            indexing_config_path: None,
        }
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Records per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunked engine or full scan
    #[serde(default)]
    pub mode: SyncMode,

    /// Sequential or bounded-parallel locale dispatch
    #[serde(default)]
    pub dispatch_mode: DispatchMode,

    /// Upper bound on concurrent locale calls in parallel mode
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Report the run as failed when any record failed to send
    #[serde(default)]
    pub fail_on_dispatch_errors: bool,

    /// Attribute allow list for documents (empty = all attributes)
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Restrict the run to one locale
    #[serde(default)]
    pub locale: Option<String>,
}

impl SyncConfig {
    /// `locale` is not checked here. A blank or disallowed locale is refused
    /// when the run starts, so the refusal lands in the run log.
    fn validate(&self) -> Result<(), String> {
        if !(1..=10_000).contains(&self.chunk_size) {
            return Err(format!(
                "sync.chunk_size must be between 1 and 10000, got {}",
                self.chunk_size
            ));
        }

        if self.max_concurrency == 0 || self.max_concurrency > 32 {
            return Err(format!(
                "sync.max_concurrency must be between 1 and 32, got {}",
                self.max_concurrency
            ));
        }

        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            mode: SyncMode::default(),
            dispatch_mode: DispatchMode::default(),
            max_concurrency: default_max_concurrency(),
            fail_on_dispatch_errors: false,
            attributes: Vec::new(),
            locale: None,
        }
    }
}

/// Run log persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory the run log is written to
    #[serde(default = "default_state_directory")]
    pub directory: String,

    /// Key under which the run log is stored
    #[serde(default = "default_log_name")]
    pub log_name: String,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("state.directory cannot be empty".to_string());
        }
        if self.log_name.is_empty()
            || !self
                .log_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!("Invalid state.log_name '{}'", self.log_name));
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            directory: default_state_directory(),
            log_name: default_log_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Emit console logs as JSON instead of human-readable text
    #[serde(default)]
    pub console_json: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging, used by the CLI before a config file is loaded
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            local_path: String::new(),
            local_rotation: default_local_rotation(),
            console_json: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            console_json: false,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_index_prefix() -> String {
    "catalog".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_chunk_size() -> usize {
    500
}

fn default_max_concurrency() -> usize {
    4
}

fn default_state_directory() -> String {
    ".catalog-sync".to_string()
}

fn default_log_name() -> String {
    "LastProductSyncLog".to_string()
}

fn default_local_path() -> String {
    "/var/log/catalog-sync".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
