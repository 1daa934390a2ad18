//! Folder listings keyed by folder id, each with the cursor position last used in that folder.
//!
//! Mutations on a key that is not cached are ignored: the next `get_items` fetches fresh.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use drive_service::DriveItem;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedListing {
    pub items: Vec<DriveItem>,
    /// Index of the item the cursor was on when the folder was last left.
    pub history_id: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    entries: BTreeMap<String, CachedListing>,
}

#[derive(Debug, Default)]
pub struct ItemCache {
    entries: Mutex<BTreeMap<String, CachedListing>>,
}

impl ItemCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached listing for `key`, or the result of `fetch` stored with a history id of 0.
    pub fn get_items<F, E>(&self, key: &str, fetch: F) -> Result<CachedListing, E>
    where
        F: FnOnce() -> Result<Vec<DriveItem>, E>,
    {
        if let Some(cached) = self.get(key) {
            tracing::debug!(key, items = cached.items.len(), "item cache hit");
            return Ok(cached);
        }
        tracing::debug!(key, "item cache miss");
        let listing = CachedListing {
            items: fetch()?,
            history_id: 0,
        };
        self.lock().insert(key.to_string(), listing.clone());
        Ok(listing)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<CachedListing> {
        self.lock().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn update_history_id(&self, key: &str, history_id: usize) {
        if let Some(listing) = self.lock().get_mut(key) {
            listing.history_id = history_id;
        }
    }

    /// Replace the items of a cached listing, keeping its history id.
    pub fn populate(&self, key: &str, items: Vec<DriveItem>) {
        if let Some(listing) = self.lock().get_mut(key) {
            listing.items = items;
        }
    }

    /// Insert `item` at the front of a cached listing.
    pub fn add_item(&self, key: &str, item: DriveItem) {
        if let Some(listing) = self.lock().get_mut(key) {
            listing.items.insert(0, item);
        }
    }

    /// Replace the cached item with the same id.
    pub fn update_item(&self, key: &str, item: DriveItem) {
        if let Some(listing) = self.lock().get_mut(key) {
            for cached in listing.items.iter_mut().filter(|cached| cached.id == item.id) {
                *cached = item.clone();
            }
        }
    }

    pub fn remove_item(&self, key: &str, id: &str) {
        if let Some(listing) = self.lock().get_mut(key) {
            listing.items.retain(|item| item.id != id);
        }
    }

    /// Drop one listing.
    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn flush_all(&self) {
        tracing::debug!("item cache flushed");
        self.lock().clear();
    }

    /// Load a snapshot written by [`ItemCache::save`].
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CacheError::io("reading cache snapshot", path, source))?;
        let snapshot: Snapshot =
            serde_json::from_str(&raw).map_err(|source| CacheError::json(path, source))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        tracing::debug!(path = %path.display(), keys = snapshot.entries.len(), "item cache loaded");
        Ok(Self {
            entries: Mutex::new(snapshot.entries),
        })
    }

    /// [`ItemCache::open`], or an empty cache when the snapshot does not exist yet.
    pub fn open_or_default(path: &Path) -> Result<Self, CacheError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        Self::open(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            entries: self.lock().clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|source| CacheError::json(path, source))?;
        fs::write(path, json)
            .map_err(|source| CacheError::io("writing cache snapshot", path, source))
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, CachedListing>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use drive_service::DriveItem;
    use pretty_assertions::assert_eq;

    use super::ItemCache;

    fn item(id: &str, name: &str) -> DriveItem {
        DriveItem {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            size: 1,
            parent_id: Some("root".to_string()),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn ids(cache: &ItemCache, key: &str) -> Vec<String> {
        cache
            .get(key)
            .map(|listing| listing.items.into_iter().map(|item| item.id).collect())
            .unwrap_or_default()
    }

    #[test]
    fn miss_fetches_once_then_hits() {
        let cache = ItemCache::new();
        let mut fetches = 0;
        for _ in 0..2 {
            let listing = cache
                .get_items("root", || {
                    fetches += 1;
                    Ok::<_, String>(vec![item("a", "a.txt")])
                })
                .expect("fetch");
            assert_eq!(listing.history_id, 0);
        }
        assert_eq!(fetches, 1);
    }

    #[test]
    fn failed_fetch_caches_nothing() {
        let cache = ItemCache::new();
        let result = cache.get_items("root", || Err::<Vec<DriveItem>, _>("offline"));
        assert_eq!(result, Err("offline"));
        assert!(!cache.contains("root"));
    }

    #[test]
    fn item_mutations_keep_the_history_id() {
        let cache = ItemCache::new();
        cache
            .get_items("root", || Ok::<_, String>(vec![item("a", "a.txt"), item("b", "b.txt")]))
            .expect("fetch");
        cache.update_history_id("root", 1);

        cache.add_item("root", item("c", "c.txt"));
        assert_eq!(ids(&cache, "root"), vec!["c", "a", "b"]);

        cache.update_item("root", item("a", "renamed.txt"));
        cache.remove_item("root", "b");
        let listing = cache.get("root").expect("cached");
        assert_eq!(listing.history_id, 1);
        assert_eq!(listing.items[1].name, "renamed.txt");
        assert_eq!(ids(&cache, "root"), vec!["c", "a"]);

        cache.populate("root", vec![item("z", "z.txt")]);
        assert_eq!(ids(&cache, "root"), vec!["z"]);
        assert_eq!(cache.get("root").expect("cached").history_id, 1);
    }

    #[test]
    fn mutations_of_uncached_keys_are_ignored() {
        let cache = ItemCache::new();
        cache.add_item("folder", item("a", "a.txt"));
        cache.update_history_id("folder", 3);
        assert!(cache.get("folder").is_none());
    }

    #[test]
    fn invalidate_and_flush_drop_listings() {
        let cache = ItemCache::new();
        for key in ["root", "folder"] {
            cache.get_items(key, || Ok::<_, String>(Vec::new())).expect("fetch");
        }
        cache.invalidate("root");
        assert!(!cache.contains("root"));
        assert!(cache.contains("folder"));
        cache.flush_all();
        assert!(!cache.contains("folder"));
    }
}
