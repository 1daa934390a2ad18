use std::fs;
use std::path::PathBuf;

use drive_service::DriveItem;
use item_cache::{CacheError, ItemCache};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn item(id: &str) -> DriveItem {
    DriveItem {
        id: id.to_string(),
        name: format!("{id}.txt"),
        mime_type: "text/plain".to_string(),
        size: 3,
        parent_id: Some("root".to_string()),
        created_at: "2026-02-14T00:00:00Z".to_string(),
    }
}

fn snapshot_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("cache.json");
    (dir, path)
}

#[test]
fn snapshot_round_trips_listings_and_history() {
    let (_dir, path) = snapshot_path();
    let cache = ItemCache::new();
    cache
        .get_items("root", || Ok::<_, String>(vec![item("a"), item("b")]))
        .expect("fetch");
    cache.update_history_id("root", 1);
    cache.save(&path).expect("snapshot should be written");

    let reopened = ItemCache::open(&path).expect("snapshot should load");
    let listing = reopened.get("root").expect("root listing");
    assert_eq!(listing.history_id, 1);
    assert_eq!(listing.items, vec![item("a"), item("b")]);
}

#[test]
fn missing_snapshot_opens_empty_only_with_default() {
    let (_dir, path) = snapshot_path();
    assert!(matches!(ItemCache::open(&path), Err(CacheError::Io { .. })));
    let cache = ItemCache::open_or_default(&path).expect("default cache");
    assert!(!cache.contains("root"));
}

#[test]
fn malformed_snapshot_reports_json_error() {
    let (_dir, path) = snapshot_path();
    fs::write(&path, "{ not json").expect("write");
    let err = ItemCache::open(&path).expect_err("malformed snapshot");
    assert!(matches!(err, CacheError::Json { .. }));
    assert!(err.to_string().contains("cache.json"));
}

#[test]
fn unknown_snapshot_version_is_rejected() {
    let (_dir, path) = snapshot_path();
    fs::write(&path, r#"{"version": 9, "entries": {}}"#).expect("write");
    assert!(matches!(
        ItemCache::open(&path),
        Err(CacheError::UnsupportedVersion { found: 9, expected: 1, .. })
    ));
}
