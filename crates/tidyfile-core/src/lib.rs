//! Core types and the backend contract for tidyfile.
//!
//! This crate provides the data transfer types exchanged with the
//! organizing backend, the error taxonomy, the async capability trait the
//! session layer is programmed against, and the in-memory backend used to
//! test everything above it.

mod backend;
mod config;
mod error;
mod model;
mod validate;

pub use backend::{Backend, BackendFuture, MemoryBackend};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::BackendError;
pub use model::{
    AnalyzeSummary, CategoryStat, Classification, DirectoryListing, DirectoryStats, DriveInfo,
    DriveKind, FileEntry, MoveOutcome, PathNode, USER_OVERRIDE_CONFIDENCE, extension_of,
};
pub use validate::{validate_filename, validate_folder_name};
