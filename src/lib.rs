// Catalog Sync - Product catalog to search index synchronization
// Copyright (c) 2025 Catalog Sync Contributors
// Licensed under the MIT License

//! # catalog-sync - product catalog to search index synchronization
//!
//! catalog-sync reads a product catalog export one record at a time, builds a
//! document per site locale and pushes the documents to a hosted search
//! index in bounded chunks, one batch call per (chunk, locale).
//!
//! ## Overview
//!
//! This library provides:
//! - **Reading** product records through a cursor that is released exactly once
//! - **Transforming** each record into one localized document per locale
//! - **Dispatching** chunks to a search index or an ingestion task per locale
//! - **Recording** the outcome of every run in a persisted run log
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Sync engine, dispatch, transformation and run log state
//! - [`adapters`] - Catalog cursors, indexing clients and run log storage
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_sync::adapters::catalog::MemoryCatalog;
//! use catalog_sync::adapters::indexing::DryRunSink;
//! use catalog_sync::adapters::storage::MemoryRunLogStore;
//! use catalog_sync::config::load_config;
//! use catalog_sync::core::state::StateManager;
//! use catalog_sync::core::sync::{JobParameters, JobRunner, SyncEngine};
//! use catalog_sync::core::transform::AttributeLocalizer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(load_config("catalog-sync.toml")?);
//!
//!     let mut engine = SyncEngine::new(
//!         config,
//!         Arc::new(MemoryCatalog::new(Vec::new())),
//!         Arc::new(DryRunSink::new()),
//!         Arc::new(AttributeLocalizer::new("id")),
//!         StateManager::new(Arc::new(MemoryRunLogStore::new())),
//!     );
//!
//!     let outcome = JobRunner::without_shutdown()
//!         .run(&mut engine, &JobParameters::all_locales())
//!         .await?;
//!
//!     println!("Processed {} records", outcome.log.processed_records);
//!     Ok(())
//! }
//! ```
//!
//! ## Counting
//!
//! `sentChunks` goes up once per dispatched chunk. Each failed (chunk,
//! locale) call adds one to `failedChunks` and its operation count to
//! `failedRecords`; each successful call adds its operation count to
//! `sentRecords`. A chunk partially failing does not fail the run unless
//! `sync.fail_on_dispatch_errors` is set.
//!
//! ## Error Handling
//!
//! Library code returns [`domain::SyncError`]; the binary maps outcomes onto
//! exit codes (0 success, 1 failed sends, 2 configuration, 5 fatal,
//! 130 interrupted).

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
