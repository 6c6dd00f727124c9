//! Storage dashboard aggregation over a bounded directory walk.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Local};
use itertools::Itertools;
use jwalk::{Parallelism, WalkDir};

use tidyfile_core::{
    extension_of, BackendError, CategoryStat, DirectoryStats, FileEntry, SessionConfig,
};

/// Destination folders offered when the user overrides a suggestion.
///
/// This mirrors the engine's classification vocabulary so manual picks and
/// engine suggestions land in the same folders.
pub const ORGANIZER_CATEGORIES: &[&str] = &[
    "Personal_Photos",
    "Travel_Photos",
    "Events",
    "Animals",
    "Landscapes",
    "Plants",
    "Food",
    "Drinks",
    "Screenshots",
    "Technology",
    "Games",
    "Wallpapers",
    "Digital_Art",
    "Traditional_Art",
    "Graphic_Design",
    "Memes",
    "Anime_Manga",
    "Scanned_Documents",
    "Diagrams",
    "Slides",
    "Vehicles",
    "Architecture",
    "Cities",
    "Sports",
    "Products",
    "Fashion",
    "Medical",
    "Science",
    "Maps",
    "Text_Images",
    "PDFs",
    "Word_Documents",
    "Spreadsheets",
    "Presentations",
    "Texts",
    "Code",
    "Web",
    "Data",
    "Compressed_Archives",
    "Windows_Executables",
    "Linux_Packages",
    "Disk_Images",
    "Videos",
    "Audio",
    "Subtitles",
    "Icons_Vectors",
    "Design",
    "Fonts",
    "Dictionaries",
    "Certificates",
    "Databases",
    "Torrents",
    "Ebooks",
    "3D_Models",
    "Backups",
    "Incomplete_Downloads",
    "Streaming_Playlists",
    "Other",
];

/// Map a lowercased extension to its dashboard category.
pub fn category_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" | "ico" | "tiff" | "heic"
        | "avif" => "Images",
        "mp4" | "mkv" | "avi" | "mov" | "webm" | "wmv" | "flv" | "m4v" | "3gp" => "Videos",
        "pdf" | "doc" | "docx" | "txt" | "md" | "rtf" | "odt" | "log" | "pages" => "Documents",
        "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aac" | "wma" | "mid" => "Audio",
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" | "iso" | "dmg" => "Archives",
        "exe" | "msi" | "app" | "deb" | "rpm" | "bin" | "sh" | "bat" => "Installers",
        "py" | "js" | "ts" | "rs" | "cpp" | "c" | "h" | "html" | "css" | "json" | "xml"
        | "yaml" | "yml" | "go" | "php" | "java" | "rb" | "swift" => "Code",
        "psd" | "ai" | "eps" | "sketch" | "fig" | "xd" | "indd" | "cdr" => "Design",
        "ttf" | "otf" | "woff" | "woff2" | "eot" => "Fonts",
        "sqlite" | "db" | "sql" | "mdb" | "accdb" | "dbf" => "Databases",
        "epub" | "mobi" | "azw3" | "djvu" | "cbz" | "cbr" => "Ebooks",
        "obj" | "stl" | "fbx" | "blend" | "3ds" | "ma" | "mb" | "gltf" | "glb" => "3D Models",
        "cfg" | "ini" | "env" | "conf" | "toml" | "prop" => "Config",
        "xls" | "xlsx" | "csv" | "ods" | "numbers" => "Spreadsheets",
        "ppt" | "pptx" | "key" | "odp" => "Presentations",
        _ => "Other",
    }
}

/// Aggregate size, counts, and top files for one directory subtree.
///
/// The walk is bounded by depth and entry count so a stats request over a
/// huge tree stays cheap; the figures are a sample, not an audit.
pub fn directory_stats(dir: &Path, config: &SessionConfig) -> Result<DirectoryStats, BackendError> {
    if !dir.exists() || !dir.is_dir() {
        return Err(BackendError::not_found(dir));
    }

    let top = config.stats_top_files;
    let mut total_size = 0u64;
    let mut total_files = 0usize;
    let mut by_category: HashMap<&'static str, (usize, u64)> = HashMap::new();
    let mut largest: Vec<FileEntry> = Vec::new();
    let mut recent: Vec<FileEntry> = Vec::new();

    for entry in walk(dir, config.stats_max_depth)
        .into_iter()
        .flatten()
        .take(config.stats_max_entries)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        let path = entry.path();
        let size = metadata.len();
        let extension = extension_of(&path);

        total_size += size;
        total_files += 1;
        let slot = by_category
            .entry(category_for_extension(&extension))
            .or_insert((0, 0));
        slot.0 += 1;
        slot.1 += size;

        let file = FileEntry {
            index: 0,
            filename: entry.file_name().to_string_lossy().to_string(),
            filepath: path,
            is_dir: false,
            size_bytes: size,
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            extension,
        };

        largest.push(file.clone());
        largest.sort_by_key(|f| Reverse(f.size_bytes));
        largest.truncate(top);

        recent.push(file);
        recent.sort_by_key(|f| Reverse(f.modified));
        recent.truncate(top);
    }

    let categories = by_category
        .into_iter()
        .map(|(name, (count, size_bytes))| CategoryStat {
            category: name.to_string(),
            count,
            size_bytes,
        })
        .sorted_by_key(|c| Reverse(c.size_bytes))
        .collect();

    Ok(DirectoryStats {
        total_size,
        total_files,
        categories,
        largest_files: largest,
        recent_files: recent,
    })
}

/// Files under `dir` whose extension maps to `category`.
///
/// Bounded like the stats walk, and cut off once enough matches are
/// collected.
pub fn files_by_category(
    dir: &Path,
    category: &str,
    config: &SessionConfig,
) -> Result<Vec<FileEntry>, BackendError> {
    if !dir.exists() || !dir.is_dir() {
        return Err(BackendError::not_found(dir));
    }

    let mut matches: Vec<FileEntry> = Vec::new();

    for entry in walk(dir, config.stats_max_depth)
        .into_iter()
        .flatten()
        .take(config.category_max_entries)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let extension = extension_of(&path);
        if category_for_extension(&extension) != category {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        matches.push(FileEntry {
            index: matches.len(),
            filename: entry.file_name().to_string_lossy().to_string(),
            filepath: path,
            is_dir: false,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            extension,
        });

        if matches.len() >= config.category_max_results {
            break;
        }
    }

    Ok(matches)
}

fn walk(dir: &Path, max_depth: usize) -> WalkDir {
    WalkDir::new(dir)
        .parallelism(Parallelism::Serial)
        .skip_hidden(true)
        .max_depth(max_depth)
}
