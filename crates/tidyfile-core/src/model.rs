//! Data transfer types shared across the backend boundary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Confidence value reserved for user-authoritative overrides.
///
/// Entries carrying this value were edited by hand and must be excluded
/// from any future automatic re-classification pass.
pub const USER_OVERRIDE_CONFIDENCE: f64 = 1.0;

/// One folder in the navigation tree.
///
/// Children are not embedded; they live in a separate cache keyed by path,
/// so any subtree can be loaded or dropped independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    /// Folder name (not the full path).
    pub name: CompactString,
    /// Absolute path; unique key for the tree cache.
    pub path: PathBuf,
    /// Whether the folder has at least one visible child folder.
    /// `false` means a child fetch is never attempted.
    pub has_children: bool,
}

impl PathNode {
    /// Create a new tree node.
    pub fn new(name: impl Into<CompactString>, path: impl Into<PathBuf>, has_children: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            has_children,
        }
    }
}

/// One row of a directory listing.
///
/// Listings are produced fresh on every fetch and never mutated in place;
/// rename/delete invalidate the owning listing instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Position within the listing after sorting.
    pub index: usize,
    /// File or folder name.
    pub filename: String,
    /// Absolute path; unique within a listing.
    pub filepath: PathBuf,
    /// Whether this entry is a directory.
    pub is_dir: bool,
    /// Size in bytes (0 for directories).
    pub size_bytes: u64,
    /// Last modification time, if the filesystem reports one.
    pub modified: Option<DateTime<Local>>,
    /// Lowercased extension without the dot, empty when absent.
    pub extension: String,
}

/// A directory listing with aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// The listed directory.
    pub path: PathBuf,
    /// Entries sorted directories-first, then case-insensitive by name.
    pub entries: Vec<FileEntry>,
    /// Number of non-directory entries.
    pub total_files: usize,
    /// Number of directory entries.
    pub total_folders: usize,
}

/// One file's AI suggestion plus its user-editable review state.
///
/// `index` is the stable key for the lifetime of one analysis session; it
/// survives removals and is never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub index: usize,
    pub filename: String,
    pub filepath: PathBuf,
    /// Destination folder, relative to the move target.
    pub suggested_folder: String,
    /// Optional AI-suggested replacement filename.
    pub suggested_name: Option<String>,
    /// Suggestion certainty in `[0, 1]`; `1.0` marks a user override.
    pub confidence: f64,
    /// Whether the entry participates in the next move.
    pub selected: bool,
    /// Whether the backend flagged this file as a duplicate.
    pub is_duplicate: bool,
    /// Canonical file's path when `is_duplicate` is set.
    pub duplicate_of: Option<PathBuf>,
}

impl Classification {
    /// Whether this entry was overridden by hand.
    pub fn is_user_override(&self) -> bool {
        self.confidence >= USER_OVERRIDE_CONFIDENCE
    }
}

/// Result of an analyze pass over one directory.
///
/// Field names match the engine's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeSummary {
    pub total_files: usize,
    pub images: usize,
    pub documents: usize,
    pub other_files: usize,
    pub classifications: Vec<Classification>,
    /// Wall-clock seconds the engine spent scanning.
    pub scan_time: f64,
    pub total_duplicates: usize,
}

impl AnalyzeSummary {
    /// Summary synthesized from semantic-search results, which carry no
    /// scan statistics of their own.
    pub fn from_search(classifications: Vec<Classification>) -> Self {
        let count = classifications.len();
        Self {
            total_files: count,
            images: count,
            documents: 0,
            other_files: 0,
            classifications,
            scan_time: 0.0,
            total_duplicates: 0,
        }
    }
}

/// Counts reported by a bulk move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Where a mounted location sits in the drive list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveKind {
    Home,
    Media,
    Mnt,
    Root,
    Drive,
}

impl DriveKind {
    /// Lowercase label used in listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Media => "media",
            Self::Mnt => "mnt",
            Self::Root => "root",
            Self::Drive => "drive",
        }
    }
}

/// A mounted location offered as a browse root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveInfo {
    pub name: String,
    pub path: PathBuf,
    pub kind: DriveKind,
    pub total_space: u64,
    pub available_space: u64,
    pub used_space: u64,
}

/// Per-category aggregate within [`DirectoryStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    pub size_bytes: u64,
}

/// Storage dashboard data for one directory subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub total_size: u64,
    pub total_files: usize,
    /// Sorted by aggregate size, descending.
    pub categories: Vec<CategoryStat>,
    /// Top entries by size, descending.
    pub largest_files: Vec<FileEntry>,
    /// Top entries by modification time, newest first.
    pub recent_files: Vec<FileEntry>,
}

/// Lowercased extension of a path, empty when absent.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
