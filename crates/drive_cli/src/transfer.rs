//! Recursive folder transfers between the drive and the local file system.

use std::fs;
use std::path::{Path, PathBuf};

use drive_service::{DriveItem, DriveService};

use crate::batch::{for_each_limited, UPLOAD_LIMIT};
use crate::error::ActionError;
use crate::naming::unique_local_path;

/// Download `item` into `dir`. Folders become local folders and their content is fetched
/// recursively, all children of one folder at once.
pub fn download_item(
    drive: &dyn DriveService,
    item: &DriveItem,
    dir: &Path,
) -> Result<PathBuf, ActionError> {
    if !item.is_folder() {
        let target = unique_local_path(dir, &item.name, false);
        tracing::debug!(id = %item.id, target = %target.display(), "downloading file");
        return Ok(drive.download(&item.id, &target)?);
    }

    let target = unique_local_path(dir, &item.name, true);
    fs::create_dir(&target)
        .map_err(|source| ActionError::local("creating folder", &target, source))?;
    let children = drive.list_items(&item.id)?;
    tracing::debug!(id = %item.id, children = children.len(), "downloading folder");
    for_each_limited("download", &children, children.len(), |child| {
        download_item(drive, child, &target).map(|_| ())
    })?;
    Ok(target)
}

/// Upload a local file, or a local folder with everything below it, into `parent_id`.
pub fn upload_path(
    drive: &dyn DriveService,
    path: &Path,
    parent_id: &str,
) -> Result<DriveItem, ActionError> {
    let metadata = fs::metadata(path)
        .map_err(|source| ActionError::local("reading upload source", path, source))?;
    if !metadata.is_dir() {
        return Ok(drive.upload(path, parent_id)?);
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            let source = std::io::ErrorKind::InvalidInput.into();
            ActionError::local("reading upload source", path, source)
        })?;
    let folder = drive.create_folder(&name, parent_id)?;

    let (mut dirs, mut files) = (Vec::new(), Vec::new());
    let entries =
        fs::read_dir(path).map_err(|source| ActionError::local("listing folder", path, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| ActionError::local("listing folder", path, source))?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            dirs.push(entry_path);
        } else {
            files.push(entry_path);
        }
    }
    dirs.sort();
    files.sort();
    tracing::debug!(
        path = %path.display(),
        files = files.len(),
        folders = dirs.len(),
        "uploading folder"
    );

    for_each_limited("upload", &files, UPLOAD_LIMIT, |file| {
        drive.upload(file, &folder.id).map(|_| ()).map_err(ActionError::from)
    })?;
    for dir in &dirs {
        upload_path(drive, dir, &folder.id)?;
    }
    Ok(folder)
}
