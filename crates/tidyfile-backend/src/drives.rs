//! Mounted drive enumeration.

use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::Disks;

use tidyfile_core::{BackendError, DriveInfo, DriveKind};

/// Enumerate browse roots: the home directory, the filesystem root, and
/// removable mounts under the usual media bases.
pub fn mounted_drives() -> Result<Vec<DriveInfo>, BackendError> {
    let disks = Disks::new_with_refreshed_list();
    let mut drives = Vec::new();

    if let Some(home) = dirs::home_dir() {
        let (total, available, used) = space_for(&disks, &home);
        drives.push(DriveInfo {
            name: "Home".to_string(),
            path: home,
            kind: DriveKind::Home,
            total_space: total,
            available_space: available,
            used_space: used,
        });
    }

    let root = PathBuf::from("/");
    let (total, available, used) = space_for(&disks, &root);
    drives.push(DriveInfo {
        name: "System".to_string(),
        path: root,
        kind: DriveKind::Root,
        total_space: total,
        available_space: available,
        used_space: used,
    });

    if let Ok(user) = std::env::var("USER") {
        let bases = [
            (PathBuf::from(format!("/media/{user}")), DriveKind::Media),
            (PathBuf::from(format!("/run/media/{user}")), DriveKind::Media),
            (PathBuf::from("/mnt"), DriveKind::Mnt),
        ];

        for (base, kind) in bases {
            let Ok(entries) = fs::read_dir(&base) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                let (total, available, used) = space_for(&disks, &path);

                // Skip pseudo-mounts and paths already listed.
                if total > 0 && !drives.iter().any(|d| d.path == path) {
                    drives.push(DriveInfo {
                        name,
                        path,
                        kind,
                        total_space: total,
                        available_space: available,
                        used_space: used,
                    });
                }
            }
        }
    }

    Ok(drives)
}

/// Space figures for the disk whose mount point is the longest prefix of
/// `path`.
fn space_for(disks: &Disks, path: &Path) -> (u64, u64, u64) {
    disks
        .list()
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())
        .map(|d| {
            let total = d.total_space();
            let available = d.available_space();
            (total, available, total.saturating_sub(available))
        })
        .unwrap_or((0, 0, 0))
}
