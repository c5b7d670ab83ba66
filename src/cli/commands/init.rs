//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "catalog-sync.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("Initializing catalog-sync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set SEARCH_APPLICATION_ID and SEARCH_API_KEY in your environment or .env file");
                println!("  3. Validate configuration: catalog-sync validate-config");
                println!("  4. Run a sync: catalog-sync sync --dry-run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# catalog-sync configuration

[application]
log_level = "info"
dry_run = false

[site]
allowed_locales = ["en_US", "fr_FR"]

[catalog]
path = "exports/products.jsonl"
id_field = "id"

[indexing]
enabled = true
variant = "search"
base_url = "https://search.example.com/1/indexes/"
index_prefix = "catalog"
application_id = "${SEARCH_APPLICATION_ID}"
api_key = "${SEARCH_API_KEY}"

[sync]
chunk_size = 500
mode = "chunked"

[state]
directory = ".catalog-sync"

[logging]
local_enabled = true
local_path = "/var/log/catalog-sync"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# catalog-sync configuration
#
# Values may reference environment variables as ${VAR}. Any key can also be
# overridden with CATALOG_SYNC_<SECTION>_<KEY>, e.g. CATALOG_SYNC_SYNC_CHUNK_SIZE.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (count operations, never call the indexing service)
dry_run = false

# ============================================================================
# Site
# ============================================================================
[site]
# Locales the site serves. Order is the dispatch order within a chunk.
allowed_locales = ["en_US", "fr_FR", "de_DE"]

# ============================================================================
# Catalog Export
# ============================================================================
[catalog]
# Newline-delimited JSON, one product per line
path = "exports/products.jsonl"

# Attribute holding the product identifier
id_field = "id"

# Full scans skip offline or non-searchable products unless this is true
include_offline = false

# ============================================================================
# Indexing Service
# ============================================================================
[indexing]
enabled = true

# search: one index per locale named <index_prefix>__products__<locale>
# ingestion: one push task per locale taken from indexing_config
variant = "search"

base_url = "https://search.example.com/1/indexes/"
index_prefix = "catalog"
application_id = "${SEARCH_APPLICATION_ID}"
api_key = "${SEARCH_API_KEY}"

# Request timeout in seconds (1-600)
timeout_seconds = 60

# Ingestion task mapping, inline or from a file (not both)
# indexing_config = '{"locales": {"en_US": {"products": {"tasks": {"replace": "task-id"}}}}}'
# indexing_config_path = "indexing.json"

# ============================================================================
# Sync
# ============================================================================
[sync]
# Records per chunk (1-10000)
chunk_size = 500

# chunked: host-stepped engine; full_scan: single loop with inclusion filter
mode = "chunked"

# sequential or parallel dispatch of one chunk's locales
dispatch_mode = "sequential"
max_concurrency = 4

# Report the run as failed when any batch fails to send
fail_on_dispatch_errors = false

# Attribute allow list (empty = all attributes)
attributes = []

# Restrict runs to one locale
# locale = "en_US"

# ============================================================================
# Run Log
# ============================================================================
[state]
directory = ".catalog-sync"
log_name = "LastProductSyncLog"

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files with rotation (daily, hourly, never)
local_enabled = true
local_path = "/var/log/catalog-sync"
local_rotation = "daily"

# JSON console output instead of human-readable text
console_json = false
"#
        .to_string()
    }
}
