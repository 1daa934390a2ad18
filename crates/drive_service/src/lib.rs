//! Storage-agnostic contract for a remote drive.
//!
//! Only item identity, folder structure, and whole-file transfers are modelled. Authentication
//! and transport belong to implementations.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

mod error;
mod format;

pub use error::DriveError;
pub use format::{format_bytes, format_date, format_quota};

/// Identifier of the drive root folder.
pub const ROOT_FOLDER_ID: &str = "root";

pub const FOLDER_MIME_TYPE: &str = "application/vnd.drive.folder";

/// Identifier of one drive item.
pub type ItemId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveItem {
    pub id: ItemId,
    pub name: String,
    pub mime_type: String,
    /// Bytes; zero for folders.
    #[serde(default)]
    pub size: u64,
    pub parent_id: Option<ItemId>,
    /// RFC3339 timestamp.
    pub created_at: String,
}

impl DriveItem {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

impl fmt::Display for DriveItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Storage usage in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageQuota {
    pub limit: u64,
    pub usage: u64,
    pub usage_in_drive: u64,
    pub usage_in_trash: u64,
}

/// Operations the file manager needs from a drive.
///
/// Calls block the calling thread; implementations must tolerate concurrent calls from
/// batch workers.
pub trait DriveService: Send + Sync + 'static {
    /// Direct children of `folder_id`, folders first.
    fn list_items(&self, folder_id: &str) -> Result<Vec<DriveItem>, DriveError>;

    fn get_item(&self, id: &str) -> Result<DriveItem, DriveError>;

    /// Display name of a folder; the root has a fixed name.
    fn folder_name(&self, id: &str) -> Result<String, DriveError> {
        if id == ROOT_FOLDER_ID {
            return Ok("My Drive".to_string());
        }
        let item = self.get_item(id)?;
        if !item.is_folder() {
            return Err(DriveError::NotAFolder { id: id.to_string() });
        }
        Ok(item.name)
    }

    /// Every folder in the drive, for move targets.
    fn list_folders(&self) -> Result<Vec<DriveItem>, DriveError>;

    fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveItem, DriveError>;

    fn rename(&self, id: &str, name: &str) -> Result<DriveItem, DriveError>;

    fn move_item(&self, id: &str, to_folder_id: &str) -> Result<DriveItem, DriveError>;

    fn move_to_trash(&self, id: &str) -> Result<(), DriveError>;

    fn list_trash(&self) -> Result<Vec<DriveItem>, DriveError>;

    /// Restore a trashed item to its previous folder.
    fn recover(&self, id: &str) -> Result<DriveItem, DriveError>;

    fn empty_trash(&self) -> Result<(), DriveError>;

    /// Delete forever, trashed or not.
    fn delete_item(&self, id: &str) -> Result<(), DriveError>;

    /// Write the file content to `destination` (a file path) and return it.
    fn download(&self, id: &str, destination: &Path) -> Result<PathBuf, DriveError>;

    /// Upload one local file into `parent_id`.
    fn upload(&self, local_path: &Path, parent_id: &str) -> Result<DriveItem, DriveError>;

    fn storage_quota(&self) -> Result<StorageQuota, DriveError>;
}
