//! Directory and folder listings.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use tidyfile_core::{BackendError, DirectoryListing, FileEntry, PathNode, extension_of};

/// List the contents of a directory.
///
/// Entries are sorted directories-first, then case-insensitive by name,
/// and reindexed after sorting. `total_files` counts non-directories only.
pub fn list_directory(dir: &Path, include_hidden: bool) -> Result<DirectoryListing, BackendError> {
    if !dir.exists() {
        return Err(BackendError::not_found(dir));
    }
    if !dir.is_dir() {
        return Err(BackendError::validation(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let read = fs::read_dir(dir).map_err(|e| BackendError::io(dir, e))?;
    let mut entries = Vec::new();
    let mut total_folders = 0;

    for entry in read.flatten() {
        let filepath = entry.path();
        let filename = entry.file_name().to_string_lossy().to_string();

        if !include_hidden && filename.starts_with('.') {
            continue;
        }

        let metadata = entry.metadata().ok();
        let is_dir = filepath.is_dir();
        if is_dir {
            total_folders += 1;
        }

        let size_bytes = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
        let modified = metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Local>::from);
        let extension = extension_of(&filepath);

        entries.push(FileEntry {
            index: 0,
            filename,
            filepath,
            is_dir,
            size_bytes,
            modified,
            extension,
        });
    }

    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.filename.to_lowercase().cmp(&b.filename.to_lowercase()),
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.index = index;
    }

    let total_files = entries.iter().filter(|e| !e.is_dir).count();

    Ok(DirectoryListing {
        path: dir.to_path_buf(),
        entries,
        total_files,
        total_folders,
    })
}

/// List the immediate child folders of a directory.
///
/// A missing or non-directory path yields an empty list rather than an
/// error so tree probes never fail the navigation pane.
pub fn list_folders(dir: &Path, include_hidden: bool) -> Result<Vec<PathNode>, BackendError> {
    if !dir.exists() || !dir.is_dir() {
        return Ok(Vec::new());
    }

    let read = fs::read_dir(dir).map_err(|e| BackendError::io(dir, e))?;
    let mut folders = Vec::new();

    for entry in read.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if !include_hidden && name.starts_with('.') {
            continue;
        }
        if !path.is_dir() {
            continue;
        }

        let has_children = fs::read_dir(&path)
            .map(|entries| {
                entries.filter_map(|e| e.ok()).any(|e| {
                    e.path().is_dir()
                        && (include_hidden || !e.file_name().to_string_lossy().starts_with('.'))
                })
            })
            .unwrap_or(false);

        folders.push(PathNode::new(name, path, has_children));
    }

    folders.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(folders)
}

/// Resolve the user's home directory.
pub fn home_directory() -> Result<PathBuf, BackendError> {
    dirs::home_dir().ok_or_else(|| BackendError::unavailable("Could not resolve the home directory"))
}
