//! End-to-end tests against a mocked indexing service
//!
//! These tests wire the real adapters the `sync` command uses: a JSONL
//! export on disk, the HTTP indexing clients and the file run log store.

use catalog_sync::adapters::storage::{FileRunLogStore, RunLogStore};
use catalog_sync::cli::commands::sync::run_sync;
use catalog_sync::config::{parse_config, CatalogSyncConfig};
use catalog_sync::core::sync::JobParameters;
use mockito::Matcher;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

fn write_catalog(dir: &Path, count: usize) -> String {
    let path = dir.join("products.jsonl");
    let lines: Vec<String> = (0..count)
        .map(|i| {
            json!({
                "id": format!("P{i}"),
                "name": {"default": format!("Shirt {i}"), "fr_FR": format!("Chemise {i}")},
                "online": true
            })
            .to_string()
        })
        .collect();
    std::fs::write(&path, lines.join("\n")).unwrap();
    path.to_string_lossy().to_string()
}

fn config(dir: &Path, catalog: &str, indexing: &str, sync: &str) -> Arc<CatalogSyncConfig> {
    let state_dir = dir.join("state");
    Arc::new(
        parse_config(&format!(
            r#"
[site]
allowed_locales = ["en_US", "fr_FR"]

[catalog]
path = "{catalog}"

[indexing]
application_id = "APP"
api_key = "KEY"
{indexing}

[sync]
{sync}

[state]
directory = "{}"

[logging]
local_enabled = false
"#,
            state_dir.to_string_lossy()
        ))
        .unwrap(),
    )
}

fn no_shutdown() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

#[tokio::test]
async fn test_search_sync_end_to_end() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path(), 5);
    let mut server = mockito::Server::new_async().await;

    let en = server
        .mock("POST", "/1/indexes/shop__products__en_US/batch")
        .match_header("x-algolia-application-id", "APP")
        .match_header("x-algolia-api-key", "KEY")
        .match_body(Matcher::Regex("Shirt".to_string()))
        .with_status(200)
        .with_body(r#"{"taskID": 1}"#)
        .expect(3)
        .create_async()
        .await;
    let fr = server
        .mock("POST", "/1/indexes/shop__products__fr_FR/batch")
        .match_body(Matcher::Regex("Chemise".to_string()))
        .with_status(200)
        .with_body(r#"{"taskID": 2}"#)
        .expect(3)
        .create_async()
        .await;

    let cfg = config(
        dir.path(),
        &catalog,
        &format!(
            "base_url = \"{}/1/indexes/\"\nindex_prefix = \"shop\"",
            server.url()
        ),
        "chunk_size = 2",
    );

    let outcome = run_sync(cfg.clone(), &JobParameters::all_locales(), false, no_shutdown())
        .await
        .unwrap();

    en.assert_async().await;
    fr.assert_async().await;

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.log.processed_records, 5);
    assert_eq!(outcome.log.sent_chunks, 3);
    assert_eq!(outcome.log.sent_records, 10);

    let stored = FileRunLogStore::new(&cfg.state.directory)
        .load("LastProductSyncLog")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, outcome.log);
}

#[tokio::test]
async fn test_server_error_counts_failed_locale() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path(), 3);
    let mut server = mockito::Server::new_async().await;

    let _en = server
        .mock("POST", "/1/indexes/shop__products__en_US/batch")
        .with_status(200)
        .with_body(r#"{"taskID": 1}"#)
        .create_async()
        .await;
    let _fr = server
        .mock("POST", "/1/indexes/shop__products__fr_FR/batch")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let cfg = config(
        dir.path(),
        &catalog,
        &format!(
            "base_url = \"{}/1/indexes/\"\nindex_prefix = \"shop\"",
            server.url()
        ),
        "",
    );

    let outcome = run_sync(cfg, &JobParameters::all_locales(), false, no_shutdown())
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.log.sent_records, 3);
    assert_eq!(outcome.log.failed_chunks, 1);
    assert_eq!(outcome.log.failed_records, 3);
}

#[tokio::test]
async fn test_ingestion_single_locale_full_scan() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path(), 4);
    let mut server = mockito::Server::new_async().await;

    let push = server
        .mock("POST", "/1/tasks/task-fr/push")
        .with_status(200)
        .with_body(r#"{"runID": "r1", "eventID": "e1"}"#)
        .expect(1)
        .create_async()
        .await;

    let cfg = config(
        dir.path(),
        &catalog,
        &format!(
            r#"variant = "ingestion"
base_url = "{}/1/"
indexing_config = '{{"locales": {{"fr_FR": {{"products": {{"tasks": {{"replace": "task-fr"}}}}}}}}}}'"#,
            server.url()
        ),
        "mode = \"full_scan\"",
    );

    let outcome = run_sync(cfg, &JobParameters::for_locale("fr_FR"), false, no_shutdown())
        .await
        .unwrap();

    push.assert_async().await;
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.log.processed_records, 4);
    assert_eq!(outcome.log.sent_records, 4);
}

#[tokio::test]
async fn test_missing_ingestion_config_fails_before_reading() {
    let dir = TempDir::new().unwrap();
    let catalog = write_catalog(dir.path(), 2);
    let mut server = mockito::Server::new_async().await;
    let never = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let cfg = config(
        dir.path(),
        &catalog,
        &format!("variant = \"ingestion\"\nbase_url = \"{}/1/\"", server.url()),
        "",
    );

    let outcome = run_sync(cfg, &JobParameters::for_locale("en_US"), false, no_shutdown())
        .await
        .unwrap();

    never.assert_async().await;
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(outcome.log.processed_records, 0);
    assert_eq!(outcome.log.processed_error_message, "Missing Indexing configuration");
}
