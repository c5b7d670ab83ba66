//! Integration tests for chunked synchronization
//!
//! These tests drive the engine end to end with in-memory adapters and
//! verify:
//! - Chunk boundaries and dispatch counts
//! - Per-locale failure isolation and counter consistency
//! - Cursor release on every exit path
//! - Run log persistence

use catalog_sync::adapters::catalog::{JsonlCatalog, MemoryCatalog};
use catalog_sync::adapters::indexing::RecordingSink;
use catalog_sync::adapters::storage::MemoryRunLogStore;
use catalog_sync::config::{parse_config, CatalogSyncConfig, DispatchMode};
use catalog_sync::core::state::StateManager;
use catalog_sync::core::sync::{JobParameters, JobRunner, RunOutcome, SyncEngine};
use catalog_sync::core::transform::AttributeLocalizer;
use catalog_sync::domain::Record;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn search_config(locales: &[&str], chunk_size: usize) -> CatalogSyncConfig {
    let locales = locales
        .iter()
        .map(|l| format!("\"{l}\""))
        .collect::<Vec<_>>()
        .join(", ");
    parse_config(&format!(
        r#"
[site]
allowed_locales = [{locales}]

[catalog]
path = "unused.jsonl"

[indexing]
base_url = "http://localhost/1/indexes/"
index_prefix = "shop"

[sync]
chunk_size = {chunk_size}

[logging]
local_enabled = false
"#
    ))
    .unwrap()
}

fn products(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::from_value(
                json!({
                    "id": format!("P{i:05}"),
                    "name": {"default": format!("Product {i}"), "fr_FR": format!("Produit {i}")},
                    "price": i,
                }),
                "id",
            )
            .unwrap()
        })
        .collect()
}

struct Harness {
    catalog: MemoryCatalog,
    sink: Arc<RecordingSink>,
    store: Arc<MemoryRunLogStore>,
}

impl Harness {
    fn new(records: Vec<Record>, sink: RecordingSink) -> Self {
        Self {
            catalog: MemoryCatalog::new(records),
            sink: Arc::new(sink),
            store: Arc::new(MemoryRunLogStore::new()),
        }
    }

    async fn run(&self, config: CatalogSyncConfig, params: JobParameters) -> RunOutcome {
        let mut engine = SyncEngine::new(
            Arc::new(config),
            Arc::new(self.catalog.clone()),
            self.sink.clone(),
            Arc::new(AttributeLocalizer::new("id")),
            StateManager::new(self.store.clone()),
        );
        let outcome = JobRunner::without_shutdown()
            .run(&mut engine, &params)
            .await
            .unwrap();
        outcome
    }
}

#[tokio::test]
async fn test_two_full_chunks_single_locale() {
    let h = Harness::new(products(1000), RecordingSink::new());
    let outcome = h
        .run(search_config(&["en_US"], 500), JobParameters::for_locale("en_US"))
        .await;

    let log = &outcome.log;
    assert_eq!(log.processed_records, 1000);
    assert_eq!(log.sent_chunks, 2);
    assert_eq!(log.sent_records, 1000);
    assert_eq!(log.failed_chunks, 0);
    assert_eq!(log.failed_records, 0);
    assert!(outcome.succeeded);
    assert_eq!(h.sink.calls(), 2);
    assert_eq!(h.catalog.close_count(), 1);
}

#[tokio::test]
async fn test_failed_chunk_keeps_run_successful() {
    let h = Harness::new(products(1000), RecordingSink::new().fail_call(1));
    let outcome = h
        .run(search_config(&["en_US"], 500), JobParameters::for_locale("en_US"))
        .await;

    let log = &outcome.log;
    assert_eq!(log.sent_chunks, 2);
    assert_eq!(log.failed_chunks, 1);
    assert_eq!(log.failed_records, 500);
    assert_eq!(log.sent_records, 500);
    assert!(!log.processed_error);
    assert!(!log.send_error);
    assert!(outcome.succeeded);
    assert!(log.is_balanced());
}

#[tokio::test]
async fn test_short_tail_chunk() {
    let h = Harness::new(products(7), RecordingSink::new());
    let outcome = h
        .run(search_config(&["en_US"], 3), JobParameters::for_locale("en_US"))
        .await;

    let sizes: Vec<_> = h.sink.batches().iter().map(|b| b.operations.len()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(outcome.log.processed_records, 7);
    assert_eq!(outcome.log.sent_chunks, 3);
}

#[tokio::test]
async fn test_locale_without_target_is_isolated() {
    let mut config = search_config(&["en_US", "fr_FR"], 500);
    config.indexing.variant = catalog_sync::config::IndexVariant::Ingestion;
    config.indexing.indexing_config = Some(
        r#"{"locales": {"en_US": {"products": {"tasks": {"replace": "task-en"}}}}}"#.to_string(),
    );

    let h = Harness::new(products(500), RecordingSink::new());
    let outcome = h.run(config, JobParameters::all_locales()).await;

    let log = &outcome.log;
    assert!(outcome.succeeded);
    assert_eq!(log.processed_records, 500);
    assert_eq!(log.sent_chunks, 1);
    assert_eq!(log.sent_records, 500);
    assert_eq!(log.failed_chunks, 0);
    assert_eq!(h.sink.batches_for("task-en").len(), 1);
    assert_eq!(h.sink.calls(), 1);
}

#[tokio::test]
async fn test_failing_locale_does_not_affect_other_locale() {
    let h = Harness::new(
        products(10),
        RecordingSink::new().fail_target("shop__products__fr_FR"),
    );
    let outcome = h
        .run(search_config(&["en_US", "fr_FR"], 4), JobParameters::all_locales())
        .await;

    let log = &outcome.log;
    assert_eq!(log.sent_chunks, 3);
    assert_eq!(log.sent_records, 10);
    assert_eq!(log.failed_chunks, 3);
    assert_eq!(log.failed_records, 10);
    assert_eq!(h.sink.batches_for("shop__products__en_US").len(), 3);
}

#[tokio::test]
async fn test_locales_dispatched_in_configured_order() {
    let h = Harness::new(products(2), RecordingSink::new());
    h.run(
        search_config(&["fr_FR", "en_US"], 500),
        JobParameters::all_locales(),
    )
    .await;

    let targets: Vec<_> = h
        .sink
        .batches()
        .iter()
        .map(|b| b.target.as_str().to_string())
        .collect();
    assert_eq!(
        targets,
        vec!["shop__products__fr_FR", "shop__products__en_US"]
    );
}

#[tokio::test]
async fn test_parallel_dispatch_matches_sequential_counters() {
    let sequential = Harness::new(products(25), RecordingSink::new().fail_target("shop__products__de_DE"));
    let seq = sequential
        .run(
            search_config(&["en_US", "fr_FR", "de_DE"], 10),
            JobParameters::all_locales(),
        )
        .await;

    let mut config = search_config(&["en_US", "fr_FR", "de_DE"], 10);
    config.sync.dispatch_mode = DispatchMode::Parallel;
    config.sync.max_concurrency = 2;
    let parallel = Harness::new(products(25), RecordingSink::new().fail_target("shop__products__de_DE"));
    let par = parallel.run(config, JobParameters::all_locales()).await;

    assert_eq!(seq.log.sent_chunks, par.log.sent_chunks);
    assert_eq!(seq.log.sent_records, par.log.sent_records);
    assert_eq!(seq.log.failed_chunks, par.log.failed_chunks);
    assert_eq!(seq.log.failed_records, par.log.failed_records);
    assert_eq!(par.log.sent_records, 50);
    assert_eq!(par.log.failed_records, 25);
}

#[tokio::test]
async fn test_localized_documents_reach_sink() {
    let h = Harness::new(products(1), RecordingSink::new());
    h.run(search_config(&["en_US", "fr_FR"], 500), JobParameters::all_locales())
        .await;

    let fr = h.sink.batches_for("shop__products__fr_FR");
    let op = serde_json::to_value(&fr[0].operations[0]).unwrap();
    assert_eq!(op["action"], "addObject");
    assert_eq!(op["body"]["objectID"], "P00000");
    assert_eq!(op["body"]["name"], "Produit 0");

    let en = h.sink.batches_for("shop__products__en_US");
    let op = serde_json::to_value(&en[0].operations[0]).unwrap();
    assert_eq!(op["body"]["name"], "Product 0");
}

#[tokio::test]
async fn test_cursor_closed_once_on_close_failure() {
    let records = products(3);
    let h = Harness {
        catalog: MemoryCatalog::new(records).failing_close(),
        sink: Arc::new(RecordingSink::new()),
        store: Arc::new(MemoryRunLogStore::new()),
    };
    let outcome = h
        .run(search_config(&["en_US"], 500), JobParameters::for_locale("en_US"))
        .await;

    assert!(outcome.succeeded);
    assert_eq!(h.catalog.close_count(), 1);
}

#[tokio::test]
async fn test_run_log_persisted_and_replaced() {
    let h = Harness::new(products(4), RecordingSink::new());
    let first = h
        .run(search_config(&["en_US"], 2), JobParameters::for_locale("en_US"))
        .await;
    let second = h
        .run(search_config(&["en_US"], 2), JobParameters::for_locale("de_DE"))
        .await;

    assert!(first.succeeded);
    assert!(second.configuration_error);

    let stored = h.store.get("LastProductSyncLog").unwrap();
    assert_eq!(stored.run_id, Some(second.run_id));
    assert_eq!(stored.processed_records, 0);
    assert!(stored.processed_error);
    assert_eq!(stored.processed_error_message, "Locale de_DE is not allowed.");
}

#[tokio::test]
async fn test_product_without_identifier_is_skipped() {
    let mut export = NamedTempFile::new().unwrap();
    writeln!(export, r#"{{"id": "P1", "name": "Shirt"}}"#).unwrap();
    writeln!(export, r#"{{"name": "no id"}}"#).unwrap();
    writeln!(export, r#"{{"id": "P3", "name": "Cap"}}"#).unwrap();
    export.flush().unwrap();

    let sink = Arc::new(RecordingSink::new());
    let store = Arc::new(MemoryRunLogStore::new());
    let mut engine = SyncEngine::new(
        Arc::new(search_config(&["en_US"], 500)),
        Arc::new(JsonlCatalog::new(export.path(), "id")),
        sink.clone(),
        Arc::new(AttributeLocalizer::new("id")),
        StateManager::new(store.clone()),
    );
    let outcome = JobRunner::without_shutdown()
        .run(&mut engine, &JobParameters::for_locale("en_US"))
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert!(!outcome.fatal);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.log.processed_records, 3);
    assert_eq!(outcome.log.sent_chunks, 1);
    assert_eq!(outcome.log.sent_records, 2);
    assert_eq!(outcome.log.failed_records, 0);

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    let ids: Vec<_> = batches[0]
        .operations
        .iter()
        .map(|op| op.object_id().cloned())
        .collect();
    assert_eq!(ids, vec![Some(json!("P1")), Some(json!("P3"))]);
    assert!(!store.get("LastProductSyncLog").unwrap().processed_error);
}
