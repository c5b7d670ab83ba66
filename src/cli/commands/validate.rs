//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the catalog-sync configuration file.

use crate::config::{load_config, IndexVariant};
use crate::core::sync::TargetResolver;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates every section; this also checks that each
    /// allowed locale resolves to an index or task.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let locales = match config.site.locales() {
            Ok(l) => l,
            Err(e) => {
                println!("Invalid site locales: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Catalog: {}", config.catalog.path);
        println!("  Indexing Enabled: {}", config.indexing.enabled);
        println!("  Variant: {:?}", config.indexing.variant);
        println!("  Base URL: {}", config.indexing.base_url);
        println!("  Sync Mode: {:?}", config.sync.mode);
        println!("  Dispatch Mode: {:?}", config.sync.dispatch_mode);
        println!("  Chunk Size: {}", config.sync.chunk_size);
        println!("  State Directory: {}", config.state.directory);
        println!();

        if let Some(locale) = &config.sync.locale {
            if !config.site.allowed_locales.iter().any(|l| l == locale.trim()) {
                println!("sync.locale {locale:?} is not one of site.allowed_locales");
                return Ok(2);
            }
        }

        if !config.indexing.enabled {
            println!("Indexing is disabled; sync runs will fail before reading the catalog");
            return Ok(0);
        }

        let resolver = match TargetResolver::from_config(&config.indexing).await {
            Ok(r) => r,
            Err(e) => {
                println!("Cannot resolve index targets: {e}");
                return Ok(2);
            }
        };

        let mut unresolved = 0;
        println!("Locale Targets:");
        for locale in &locales {
            match resolver.resolve(locale) {
                Ok(target) => println!("  {locale} -> {target}"),
                Err(e) => {
                    unresolved += 1;
                    println!("  {locale} -> {e}");
                }
            }
        }
        println!();

        if unresolved == locales.len() {
            println!("No locale resolves to a target");
            Ok(2)
        } else if unresolved > 0 && config.indexing.variant == IndexVariant::Ingestion {
            println!("Configuration is valid; {unresolved} locale(s) will be skipped");
            Ok(0)
        } else {
            println!("Configuration is valid");
            Ok(0)
        }
    }
}
