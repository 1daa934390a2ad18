//! Deterministic in-memory implementation of the `drive_service` contract.
//!
//! Used for local runs and for tests of the file manager. Content lives in memory; transfers
//! read and write real local files.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use drive_service::{
    DriveError, DriveItem, DriveService, ItemId, StorageQuota, FOLDER_MIME_TYPE, ROOT_FOLDER_ID,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Stable backend identifier used for explicit startup selection.
pub const MOCK_BACKEND_ID: &str = "mock";

const QUOTA_LIMIT: u64 = 15 * 1024 * 1024 * 1024;
const SEED_TIMESTAMP: &str = "2026-01-01T09:30:00Z";

#[derive(Debug, Clone)]
struct Entry {
    item: DriveItem,
    trashed: bool,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct DriveState {
    entries: BTreeMap<ItemId, Entry>,
    next_id: u64,
    failing: HashSet<ItemId>,
}

impl DriveState {
    fn allocate_id(&mut self) -> ItemId {
        self.next_id += 1;
        format!("mock-{}", self.next_id)
    }

    fn check_failing(&self, id: &str) -> Result<(), DriveError> {
        if self.failing.contains(id) {
            return Err(DriveError::Backend(format!("simulated failure for '{id}'")));
        }
        Ok(())
    }

    fn entry(&self, id: &str) -> Result<&Entry, DriveError> {
        self.check_failing(id)?;
        self.entries.get(id).ok_or_else(|| DriveError::not_found(id))
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Entry, DriveError> {
        self.check_failing(id)?;
        self.entries.get_mut(id).ok_or_else(|| DriveError::not_found(id))
    }

    fn ensure_folder(&self, id: &str) -> Result<(), DriveError> {
        if id == ROOT_FOLDER_ID {
            return self.check_failing(id);
        }
        let entry = self.entry(id)?;
        if entry.trashed {
            return Err(DriveError::not_found(id));
        }
        if !entry.item.is_folder() {
            return Err(DriveError::NotAFolder { id: id.to_string() });
        }
        Ok(())
    }

    fn children(&self, folder_id: &str) -> impl Iterator<Item = &Entry> + '_ {
        let folder_id = folder_id.to_string();
        self.entries
            .values()
            .filter(move |entry| entry.item.parent_id.as_deref() == Some(folder_id.as_str()))
    }

    fn ensure_unique_folder_name(
        &self,
        name: &str,
        parent_id: &str,
        except: Option<&str>,
    ) -> Result<(), DriveError> {
        let taken = self.children(parent_id).any(|entry| {
            !entry.trashed
                && entry.item.is_folder()
                && entry.item.name == name
                && Some(entry.item.id.as_str()) != except
        });
        if taken {
            return Err(DriveError::NameConflict {
                name: name.to_string(),
                parent: parent_id.to_string(),
            });
        }
        Ok(())
    }

    /// `id` and every item below it.
    fn subtree(&self, id: &str) -> Vec<ItemId> {
        let mut ids = vec![id.to_string()];
        let mut index = 0;
        while index < ids.len() {
            let current = ids[index].clone();
            ids.extend(self.children(&current).map(|entry| entry.item.id.clone()));
            index += 1;
        }
        ids
    }

    fn is_hidden_by_trash(&self, entry: &Entry) -> bool {
        let mut parent = entry.item.parent_id.clone();
        while let Some(id) = parent {
            match self.entries.get(&id) {
                Some(ancestor) if ancestor.trashed => return true,
                Some(ancestor) => parent = ancestor.item.parent_id.clone(),
                None => return false,
            }
        }
        false
    }

    fn insert(
        &mut self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        content: Vec<u8>,
    ) -> DriveItem {
        let id = self.allocate_id();
        let item = DriveItem {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: content.len() as u64,
            parent_id: Some(parent_id.to_string()),
            created_at: now_rfc3339(),
        };
        self.entries.insert(
            id,
            Entry {
                item: item.clone(),
                trashed: false,
                content,
            },
        );
        item
    }
}

/// In-memory drive with optional per-call latency.
#[derive(Debug, Default)]
pub struct MockDrive {
    state: Mutex<DriveState>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

struct CallGuard<'a> {
    drive: &'a MockDrive,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.drive.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockDrive {
    /// An empty drive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A small drive with a few folders and files.
    #[must_use]
    pub fn seeded() -> Self {
        let drive = Self::new();
        {
            let mut state = lock_unpoisoned(&drive.state);
            let documents = seed(&mut state, "Documents", FOLDER_MIME_TYPE, ROOT_FOLDER_ID, b"");
            let photos = seed(&mut state, "Photos", FOLDER_MIME_TYPE, ROOT_FOLDER_ID, b"");
            seed(&mut state, "notes.txt", "text/plain", ROOT_FOLDER_ID, b"remember the milk\n");
            seed(&mut state, "report.pdf", "application/pdf", &documents, b"%PDF-1.7 mock report");
            seed(&mut state, "budget.docx", mime_for_name("budget.docx"), &documents, b"budget");
            let archive = seed(&mut state, "Archive", FOLDER_MIME_TYPE, &documents, b"");
            seed(&mut state, "2025.txt", "text/plain", &archive, b"old notes");
            seed(&mut state, "beach.jpg", "image/jpeg", &photos, b"\xff\xd8\xff mock jpeg");
            seed(&mut state, "sunset.png", "image/png", &photos, b"\x89PNG mock png");
        }
        drive
    }

    /// Sleep this long at the start of every call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every call touching `id` fail with a backend error.
    pub fn fail_item(&self, id: impl Into<ItemId>) {
        lock_unpoisoned(&self.state).failing.insert(id.into());
    }

    /// Highest number of calls that were in flight at the same time.
    #[must_use]
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Looks an item up by name below `parent_id`, trashed or not.
    #[must_use]
    pub fn find(&self, parent_id: &str, name: &str) -> Option<DriveItem> {
        let state = lock_unpoisoned(&self.state);
        let found = state
            .children(parent_id)
            .find(|entry| entry.item.name == name)
            .map(|entry| entry.item.clone());
        found
    }

    fn begin(&self, operation: &'static str, id: &str) -> CallGuard<'_> {
        tracing::debug!(operation, id, "mock drive call");
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        CallGuard { drive: self }
    }
}

impl DriveService for MockDrive {
    fn list_items(&self, folder_id: &str) -> Result<Vec<DriveItem>, DriveError> {
        let _call = self.begin("list_items", folder_id);
        let state = lock_unpoisoned(&self.state);
        state.ensure_folder(folder_id)?;
        let mut items: Vec<DriveItem> = state
            .children(folder_id)
            .filter(|entry| !entry.trashed)
            .map(|entry| entry.item.clone())
            .collect();
        items.sort_by(|a, b| b.is_folder().cmp(&a.is_folder()).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    fn get_item(&self, id: &str) -> Result<DriveItem, DriveError> {
        let _call = self.begin("get_item", id);
        let state = lock_unpoisoned(&self.state);
        Ok(state.entry(id)?.item.clone())
    }

    fn list_folders(&self) -> Result<Vec<DriveItem>, DriveError> {
        let _call = self.begin("list_folders", ROOT_FOLDER_ID);
        let state = lock_unpoisoned(&self.state);
        let mut folders: Vec<DriveItem> = state
            .entries
            .values()
            .filter(|entry| {
                entry.item.is_folder() && !entry.trashed && !state.is_hidden_by_trash(entry)
            })
            .map(|entry| entry.item.clone())
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveItem, DriveError> {
        let _call = self.begin("create_folder", parent_id);
        let mut state = lock_unpoisoned(&self.state);
        state.ensure_folder(parent_id)?;
        state.ensure_unique_folder_name(name, parent_id, None)?;
        Ok(state.insert(name, FOLDER_MIME_TYPE, parent_id, Vec::new()))
    }

    fn rename(&self, id: &str, name: &str) -> Result<DriveItem, DriveError> {
        let _call = self.begin("rename", id);
        let mut state = lock_unpoisoned(&self.state);
        let entry = state.entry(id)?;
        if entry.item.is_folder() {
            let parent = entry.item.parent_id.clone().unwrap_or_else(|| ROOT_FOLDER_ID.to_string());
            state.ensure_unique_folder_name(name, &parent, Some(id))?;
        }
        let entry = state.entry_mut(id)?;
        entry.item.name = name.to_string();
        Ok(entry.item.clone())
    }

    fn move_item(&self, id: &str, to_folder_id: &str) -> Result<DriveItem, DriveError> {
        let _call = self.begin("move_item", id);
        let mut state = lock_unpoisoned(&self.state);
        state.entry(id)?;
        state.ensure_folder(to_folder_id)?;
        if state.subtree(id).iter().any(|inner| inner == to_folder_id) {
            return Err(DriveError::Backend(format!(
                "cannot move '{id}' into itself or one of its subfolders"
            )));
        }
        let entry = state.entry_mut(id)?;
        entry.item.parent_id = Some(to_folder_id.to_string());
        Ok(entry.item.clone())
    }

    fn move_to_trash(&self, id: &str) -> Result<(), DriveError> {
        let _call = self.begin("move_to_trash", id);
        let mut state = lock_unpoisoned(&self.state);
        state.entry_mut(id)?.trashed = true;
        Ok(())
    }

    fn list_trash(&self) -> Result<Vec<DriveItem>, DriveError> {
        let _call = self.begin("list_trash", ROOT_FOLDER_ID);
        let state = lock_unpoisoned(&self.state);
        Ok(state
            .entries
            .values()
            .filter(|entry| entry.trashed && !state.is_hidden_by_trash(entry))
            .map(|entry| entry.item.clone())
            .collect())
    }

    fn recover(&self, id: &str) -> Result<DriveItem, DriveError> {
        let _call = self.begin("recover", id);
        let mut state = lock_unpoisoned(&self.state);
        let parent = state.entry(id)?.item.parent_id.clone();
        let parent_exists = parent
            .as_deref()
            .is_some_and(|parent| parent == ROOT_FOLDER_ID || state.entries.contains_key(parent));
        let entry = state.entry_mut(id)?;
        entry.trashed = false;
        if !parent_exists {
            entry.item.parent_id = Some(ROOT_FOLDER_ID.to_string());
        }
        Ok(entry.item.clone())
    }

    fn empty_trash(&self) -> Result<(), DriveError> {
        let _call = self.begin("empty_trash", ROOT_FOLDER_ID);
        let mut state = lock_unpoisoned(&self.state);
        let trashed: Vec<ItemId> = state
            .entries
            .values()
            .filter(|entry| entry.trashed)
            .map(|entry| entry.item.id.clone())
            .collect();
        for id in trashed {
            for inner in state.subtree(&id) {
                state.entries.remove(&inner);
            }
        }
        Ok(())
    }

    fn delete_item(&self, id: &str) -> Result<(), DriveError> {
        let _call = self.begin("delete_item", id);
        let mut state = lock_unpoisoned(&self.state);
        state.entry(id)?;
        for inner in state.subtree(id) {
            state.entries.remove(&inner);
        }
        Ok(())
    }

    fn download(&self, id: &str, destination: &Path) -> Result<PathBuf, DriveError> {
        let _call = self.begin("download", id);
        let content = {
            let state = lock_unpoisoned(&self.state);
            let entry = state.entry(id)?;
            if entry.item.is_folder() {
                return Err(DriveError::IsAFolder { id: id.to_string() });
            }
            entry.content.clone()
        };
        fs::write(destination, content)
            .map_err(|source| DriveError::io("writing download", destination, source))?;
        Ok(destination.to_path_buf())
    }

    fn upload(&self, local_path: &Path, parent_id: &str) -> Result<DriveItem, DriveError> {
        let _call = self.begin("upload", parent_id);
        let content = fs::read(local_path)
            .map_err(|source| DriveError::io("reading upload source", local_path, source))?;
        let name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DriveError::Backend(format!("{} has no file name", local_path.display()))
            })?;
        let mut state = lock_unpoisoned(&self.state);
        state.ensure_folder(parent_id)?;
        Ok(state.insert(&name, mime_for_name(&name), parent_id, content))
    }

    fn storage_quota(&self) -> Result<StorageQuota, DriveError> {
        let _call = self.begin("storage_quota", ROOT_FOLDER_ID);
        let state = lock_unpoisoned(&self.state);
        let (mut usage_in_drive, mut usage_in_trash) = (0, 0);
        for entry in state.entries.values() {
            if entry.trashed || state.is_hidden_by_trash(entry) {
                usage_in_trash += entry.item.size;
            } else {
                usage_in_drive += entry.item.size;
            }
        }
        Ok(StorageQuota {
            limit: QUOTA_LIMIT,
            usage: usage_in_drive + usage_in_trash,
            usage_in_drive,
            usage_in_trash,
        })
    }
}

fn seed(
    state: &mut DriveState,
    name: &str,
    mime_type: &str,
    parent_id: &str,
    content: &[u8],
) -> ItemId {
    let id = state.insert(name, mime_type, parent_id, content.to_vec()).id;
    if let Some(entry) = state.entries.get_mut(&id) {
        entry.item.created_at = SEED_TIMESTAMP.to_string();
    }
    id
}

fn mime_for_name(name: &str) -> &'static str {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt") | Some("md") => "text/plain",
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| SEED_TIMESTAMP.to_string())
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
