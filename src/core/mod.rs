//! Core synchronization logic for catalog-sync.
//!
//! - [`sync`] - chunking, dispatch, the engine and its runners
//! - [`state`] - the persisted run log
//! - [`transform`] - record → per-locale document transformation
//!
//! # Workflow
//!
//! 1. **Initialize**: resolve locale targets, open the catalog cursor, load the previous run log
//! 2. **Read / Transform**: one record at a time into a document per locale
//! 3. **Accumulate**: fill a bounded chunk
//! 4. **Dispatch**: one batch call per (chunk, locale), counting successes and failures
//! 5. **Finalize**: close the cursor, stamp the run log and persist it
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_sync::adapters::catalog::JsonlCatalog;
//! use catalog_sync::adapters::indexing::create_batch_sink;
//! use catalog_sync::adapters::storage::FileRunLogStore;
//! use catalog_sync::config::load_config;
//! use catalog_sync::core::state::StateManager;
//! use catalog_sync::core::sync::{JobParameters, JobRunner, SyncEngine};
//! use catalog_sync::core::transform::AttributeLocalizer;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(load_config("catalog-sync.toml")?);
//! let sink = create_batch_sink(&config, false)?;
//! let store = Arc::new(FileRunLogStore::new(&config.state.directory));
//!
//! let mut engine = SyncEngine::new(
//!     config.clone(),
//!     Arc::new(JsonlCatalog::new(&config.catalog.path, &config.catalog.id_field)),
//!     sink,
//!     Arc::new(AttributeLocalizer::new(&config.catalog.id_field)),
//!     StateManager::new(store),
//! );
//!
//! let outcome = JobRunner::without_shutdown()
//!     .run(&mut engine, &JobParameters::for_locale("en_US"))
//!     .await?;
//! println!("Sent: {}", outcome.log.sent_records);
//! # Ok(())
//! # }
//! ```

pub mod state;
pub mod sync;
pub mod transform;
