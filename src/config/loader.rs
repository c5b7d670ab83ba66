//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CatalogSyncConfig, IndexVariant};
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "CATALOG_SYNC";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`CatalogSyncConfig`]
/// 4. Applies environment variable overrides (`CATALOG_SYNC_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Every failure is reported as [`SyncError::Configuration`].
///
/// # Examples
///
/// ```no_run
/// use catalog_sync::config::load_config;
///
/// let config = load_config("catalog-sync.toml").expect("Failed to load config");
/// println!("chunk size: {}", config.sync.chunk_size);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CatalogSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Returns [`SyncError::Configuration`] on missing variables, TOML syntax
/// errors or failed validation.
pub fn parse_config(contents: &str) -> Result<CatalogSyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CatalogSyncConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

/// Applies environment variable overrides using the `CATALOG_SYNC_` prefix
///
/// Variables follow the pattern `CATALOG_SYNC_<SECTION>_<KEY>`, for example
/// `CATALOG_SYNC_INDEXING_API_KEY` or `CATALOG_SYNC_SYNC_CHUNK_SIZE`.
/// Values that fail to parse leave the file setting in place; validation
/// runs afterwards.
fn apply_env_overrides(config: &mut CatalogSyncConfig) {
    // Application overrides
    if let Some(val) = env_override("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_override("APPLICATION", "DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(config.application.dry_run);
    }

    // Site overrides (comma separated)
    if let Some(val) = env_override("SITE", "ALLOWED_LOCALES") {
        config.site.allowed_locales = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    // Catalog overrides
    if let Some(val) = env_override("CATALOG", "PATH") {
        config.catalog.path = val;
    }
    if let Some(val) = env_override("CATALOG", "ID_FIELD") {
        config.catalog.id_field = val;
    }

    // Indexing overrides
    if let Some(val) = env_override("INDEXING", "ENABLED") {
        config.indexing.enabled = val.parse().unwrap_or(config.indexing.enabled);
    }
    if let Some(val) = env_override("INDEXING", "VARIANT") {
        match val.to_lowercase().as_str() {
            "search" => config.indexing.variant = IndexVariant::Search,
            "ingestion" => config.indexing.variant = IndexVariant::Ingestion,
            _ => tracing::warn!(value = %val, "Ignoring invalid indexing variant override"),
        }
    }
    if let Some(val) = env_override("INDEXING", "BASE_URL") {
        config.indexing.base_url = val;
    }
    if let Some(val) = env_override("INDEXING", "INDEX_PREFIX") {
        config.indexing.index_prefix = val;
    }
    if let Some(val) = env_override("INDEXING", "APPLICATION_ID") {
        config.indexing.application_id = Some(val);
    }
    if let Some(val) = env_override("INDEXING", "API_KEY") {
        config.indexing.api_key = Some(secret_string(val));
    }
    if let Some(val) = env_override("INDEXING", "TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.indexing.timeout_seconds = timeout;
        }
    }
    if let Some(val) = env_override("INDEXING", "CONFIG") {
        config.indexing.indexing_config = Some(val);
    }

    // Sync overrides
    if let Some(val) = env_override("SYNC", "CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.sync.chunk_size = size;
        }
    }
    if let Some(val) = env_override("SYNC", "MODE") {
        if let Ok(mode) = val.parse() {
            config.sync.mode = mode;
        }
    }
    if let Some(val) = env_override("SYNC", "MAX_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.sync.max_concurrency = concurrency;
        }
    }
    if let Some(val) = env_override("SYNC", "FAIL_ON_DISPATCH_ERRORS") {
        config.sync.fail_on_dispatch_errors =
            val.parse().unwrap_or(config.sync.fail_on_dispatch_errors);
    }
    if let Some(val) = env_override("SYNC", "LOCALE") {
        config.sync.locale = Some(val);
    }

    // State overrides
    if let Some(val) = env_override("STATE", "DIRECTORY") {
        config.state.directory = val;
    }

    // Logging overrides
    if let Some(val) = env_override("LOGGING", "LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(config.logging.local_enabled);
    }
    if let Some(val) = env_override("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[site]
allowed_locales = ["en_US", "fr_FR"]

[catalog]
path = "products.jsonl"

[indexing]
base_url = "https://shop-dsn.example.net/1/indexes/"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("LOADER_TEST_API_KEY", "test_value");
        let input = "api_key = \"${LOADER_TEST_API_KEY}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result.trim_end(), "api_key = \"test_value\"");
        std::env::remove_var("LOADER_TEST_API_KEY");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("LOADER_TEST_MISSING_VAR");
        let input = "api_key = \"${LOADER_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("LOADER_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# api_key = \"${LOADER_TEST_NEVER_SET}\"\nchunk_size = 10";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${LOADER_TEST_NEVER_SET}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent-catalog-sync.toml").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.site.allowed_locales, vec!["en_US", "fr_FR"]);
        assert_eq!(config.catalog.path, "products.jsonl");
        assert_eq!(config.sync.chunk_size, 500);
        assert_eq!(config.indexing.variant, IndexVariant::Search);
        assert!(config.indexing.enabled);
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let contents = format!("{MINIMAL}\n[sync]\nchunk_size = 0\n");
        let err = parse_config(&contents).unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_parse_config_rejects_bad_toml() {
        let err = parse_config("[site\nallowed_locales = ").unwrap_err();
        assert!(err.is_configuration());
    }
}
