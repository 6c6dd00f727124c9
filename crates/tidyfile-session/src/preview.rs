//! Inline file previews as base64 data URLs.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use tidyfile_core::{extension_of, SessionConfig};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "wmv", "flv", "m4v", "3gp",
];

/// What the UI should render for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Image { data_url: String },
    Audio { data_url: String },
    Pdf { data_url: String },
    /// Video previews are intentionally disabled; render a placeholder.
    VideoDisabled,
    /// No preview for this extension.
    Unsupported,
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("File is {size} bytes, over the {limit} byte preview limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to read file for preview")]
    Io(#[from] std::io::Error),
}

/// Build a preview for `path`, reading at most
/// [`SessionConfig::preview_max_bytes`] of content.
///
/// Unsupported and video extensions are decided without touching the file.
/// Errors mean a preview was expected but could not be produced; callers
/// render those as an "unavailable" placeholder.
pub fn load_preview(path: &Path, config: &SessionConfig) -> Result<Preview, PreviewError> {
    let extension = extension_of(path);

    if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(Preview::VideoDisabled);
    }
    let Some(mime) = mime_for(&extension) else {
        return Ok(Preview::Unsupported);
    };

    let size = fs::metadata(path)?.len();
    if size > config.preview_max_bytes {
        return Err(PreviewError::TooLarge {
            size,
            limit: config.preview_max_bytes,
        });
    }

    let bytes = fs::read(path)?;
    let data_url = format!("data:{mime};base64,{}", STANDARD.encode(&bytes));

    Ok(match mime {
        "application/pdf" => Preview::Pdf { data_url },
        m if m.starts_with("audio/") => Preview::Audio { data_url },
        _ => Preview::Image { data_url },
    })
}

fn mime_for(extension: &str) -> Option<&'static str> {
    Some(match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "pdf" => "application/pdf",
        _ => return None,
    })
}
