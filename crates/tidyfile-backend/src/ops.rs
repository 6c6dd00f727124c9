//! Filesystem mutations: bulk move, rename, delete.

use std::fs;
use std::path::{Path, PathBuf};

use tidyfile_core::{validate_filename, BackendError, Classification, MoveOutcome};

/// Move every selected classification into `dest/<suggested_folder>/`.
///
/// Unselected entries count as skipped, never failed. A vanished source,
/// an uncreatable category folder, or a failed transfer marks that one
/// entry failed and the batch continues; the call itself only errors on
/// inputs that make the whole batch meaningless.
pub fn move_files(
    dest: &Path,
    classifications: &[Classification],
    apply_renaming: bool,
) -> Result<MoveOutcome, BackendError> {
    if dest.as_os_str().is_empty() {
        return Err(BackendError::validation("destination path is empty"));
    }

    let mut outcome = MoveOutcome::default();

    for cls in classifications {
        if !cls.selected {
            outcome.skipped += 1;
            continue;
        }
        if !cls.filepath.exists() {
            tracing::warn!(path = %cls.filepath.display(), "move source no longer exists");
            outcome.failed += 1;
            continue;
        }

        let category_dir = dest.join(&cls.suggested_folder);
        if let Err(e) = fs::create_dir_all(&category_dir) {
            tracing::warn!(dir = %category_dir.display(), error = %e, "cannot create category folder");
            outcome.failed += 1;
            continue;
        }

        let name = match &cls.suggested_name {
            Some(suggested) if apply_renaming && !suggested.is_empty() => suggested.as_str(),
            _ => cls.filename.as_str(),
        };
        let target = unique_destination(&category_dir.join(name));

        match transfer(&cls.filepath, &target) {
            Ok(()) => outcome.successful += 1,
            Err(e) => {
                tracing::warn!(
                    source = %cls.filepath.display(),
                    target = %target.display(),
                    error = %e,
                    "move failed"
                );
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Rename `path` to `new_name` within its parent directory.
///
/// Rejects invalid names and refuses to clobber an existing entry.
pub fn rename_file(path: &Path, new_name: &str) -> Result<(), BackendError> {
    validate_filename(new_name).map_err(BackendError::validation)?;

    if !path.exists() {
        return Err(BackendError::not_found(path));
    }

    let parent = path
        .parent()
        .ok_or_else(|| BackendError::validation("path has no parent directory"))?;
    let target = parent.join(new_name);

    if target.exists() {
        return Err(BackendError::validation(format!(
            "a file named \"{new_name}\" already exists"
        )));
    }

    fs::rename(path, &target).map_err(|e| BackendError::io(path, e))
}

/// Permanently delete a file or directory. No trash, no undo.
pub fn delete_file(path: &Path) -> Result<(), BackendError> {
    if !path.exists() {
        return Err(BackendError::not_found(path));
    }

    if path.is_dir() {
        fs::remove_dir_all(path).map_err(|e| BackendError::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| BackendError::io(path, e))
    }
}

/// Move a single file, falling back to copy + remove across filesystems.
fn transfer(source: &Path, target: &Path) -> std::io::Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    fs::copy(source, target)?;
    fs::remove_file(source)
}

/// Append `_1`, `_2`, ... to the file stem until the path is unused.
fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let extension = path.extension().and_then(|e| e.to_str());

    for i in 1..1000 {
        let candidate = match extension {
            Some(ext) => parent.join(format!("{stem}_{i}.{ext}")),
            None => parent.join(format!("{stem}_{i}")),
        };
        if !candidate.exists() {
            return candidate;
        }
    }

    // Fallback: use timestamp
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    match extension {
        Some(ext) => parent.join(format!("{stem}_{timestamp}.{ext}")),
        None => parent.join(format!("{stem}_{timestamp}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn classification(path: &Path, folder: &str, selected: bool) -> Classification {
        Classification {
            index: 0,
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            filepath: path.to_path_buf(),
            suggested_folder: folder.to_string(),
            suggested_name: None,
            confidence: 0.9,
            selected,
            is_duplicate: false,
            duplicate_of: None,
        }
    }

    #[test]
    fn test_move_selected_into_category_folder() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = src.path().join("photo.jpg");
        fs::write(&file, b"jpeg").unwrap();

        let outcome =
            move_files(dest.path(), &[classification(&file, "Images", true)], false).unwrap();

        assert_eq!(outcome.successful, 1);
        assert_eq!(outcome.failed, 0);
        assert!(!file.exists());
        assert!(dest.path().join("Images/photo.jpg").exists());
    }

    #[test]
    fn test_move_skips_unselected() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = src.path().join("notes.txt");
        fs::write(&file, b"keep me").unwrap();

        let outcome =
            move_files(dest.path(), &[classification(&file, "Documents", false)], false).unwrap();

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.successful, 0);
        assert!(file.exists());
    }

    #[test]
    fn test_move_missing_source_counts_failed() {
        let dest = TempDir::new().unwrap();
        let ghost = dest.path().join("never-existed.bin");

        let outcome =
            move_files(dest.path(), &[classification(&ghost, "Other", true)], false).unwrap();

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.successful, 0);
    }

    #[test]
    fn test_move_collision_appends_counter() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = src.path().join("report.pdf");
        fs::write(&file, b"new").unwrap();
        fs::create_dir_all(dest.path().join("Documents")).unwrap();
        fs::write(dest.path().join("Documents/report.pdf"), b"old").unwrap();

        let outcome =
            move_files(dest.path(), &[classification(&file, "Documents", true)], false).unwrap();

        assert_eq!(outcome.successful, 1);
        assert!(dest.path().join("Documents/report.pdf").exists());
        assert!(dest.path().join("Documents/report_1.pdf").exists());
    }

    #[test]
    fn test_move_applies_suggested_name_when_asked() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = src.path().join("IMG_2041.jpg");
        fs::write(&file, b"jpeg").unwrap();

        let mut cls = classification(&file, "Images", true);
        cls.suggested_name = Some("beach-sunset.jpg".to_string());

        move_files(dest.path(), std::slice::from_ref(&cls), true).unwrap();
        assert!(dest.path().join("Images/beach-sunset.jpg").exists());

        // Without apply_renaming the original name is kept.
        fs::write(&file, b"jpeg").unwrap();
        move_files(dest.path(), &[cls], false).unwrap();
        assert!(dest.path().join("Images/IMG_2041.jpg").exists());
    }

    #[test]
    fn test_rename_rejects_existing_target() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let err = rename_file(&a, "b.txt").unwrap_err();
        assert!(matches!(err, BackendError::Validation { .. }));
        assert!(a.exists());
        assert_eq!(fs::read(&b).unwrap(), b"b");
    }

    #[test]
    fn test_rename_moves_within_parent() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("draft.md");
        fs::write(&old, b"text").unwrap();

        rename_file(&old, "final.md").unwrap();

        assert!(!old.exists());
        assert!(dir.path().join("final.md").exists());
    }

    #[test]
    fn test_rename_validates_name() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x.txt");
        fs::write(&file, b"x").unwrap();

        assert!(rename_file(&file, "").is_err());
        assert!(rename_file(&file, "a/b.txt").is_err());
        assert!(file.exists());
    }

    #[test]
    fn test_delete_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("junk.tmp");
        let sub = dir.path().join("old-stuff");
        fs::write(&file, b"junk").unwrap();
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("inner.txt"), b"inner").unwrap();

        delete_file(&file).unwrap();
        delete_file(&sub).unwrap();

        assert!(!file.exists());
        assert!(!sub.exists());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = delete_file(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, BackendError::PathNotFound { .. }));
    }
}
