//! Item names: keeping extensions on rename and avoiding local collisions.

use std::path::{Path, PathBuf};

/// Extensions a rename never drops.
const KNOWN_EXTENSIONS: &[&str] = &[
    "mp4", "jpg", "jpeg", "png", "gif", "pdf", "svg", "wav", "mp3", "docx",
];

fn extension(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Name to send to the drive when `old` is renamed to `typed`.
///
/// A known extension on the old name is carried over unless the new name already ends with it.
pub fn keep_extension(old: &str, typed: &str) -> String {
    let typed = typed.trim();
    let known = |ext: &&str| KNOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str());
    let Some(ext) = extension(old).filter(known) else {
        return typed.to_string();
    };
    if extension(typed).is_some_and(|typed_ext| typed_ext.eq_ignore_ascii_case(ext)) {
        return typed.to_string();
    }
    format!("{typed}.{ext}")
}

/// `dir/name`, or the first free `dir/name (n)` when it is taken. Files keep their extension
/// after the counter.
pub fn unique_local_path(dir: &Path, name: &str, is_folder: bool) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match extension(name).filter(|_| !is_folder) {
        Some(ext) => (&name[..name.len() - ext.len() - 1], Some(ext)),
        None => (name, None),
    };
    (1..)
        .map(|counter| match ext {
            Some(ext) => dir.join(format!("{stem} ({counter}).{ext}")),
            None => dir.join(format!("{stem} ({counter})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
