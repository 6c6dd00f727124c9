//! Name validation shared by rename commits, custom destination folders,
//! and the local backend's rename operation.

/// Validate a filename for cross-platform compatibility.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }

    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".into());
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(format!("Name cannot contain '{}'", c.escape_default()));
        }
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err("Name cannot start or end with spaces".into());
    }

    if name.ends_with('.') {
        return Err("Name cannot end with a dot".into());
    }

    if name == "." || name == ".." {
        return Err("'.' and '..' are reserved names".into());
    }

    Ok(())
}

/// Validate a destination folder name.
///
/// Folder names follow the filename rules and additionally reject
/// backslashes, so a single path component is guaranteed on every
/// platform.
pub fn validate_folder_name(name: &str) -> Result<(), String> {
    validate_filename(name)?;

    if name.contains('\\') {
        return Err("Folder name cannot contain '\\'".into());
    }

    Ok(())
}
