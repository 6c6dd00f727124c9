//! Local backend for tidyfile.
//!
//! This crate implements the [`Backend`] capability trait against the local
//! filesystem and a sidecar classification engine:
//!
//! - **Listings, folders, drives, stats** are computed in-process; the
//!   blocking filesystem work runs on tokio's blocking pool.
//! - **Analysis and semantic search** shell out to the engine binary, one
//!   process per request, JSON over stdout.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tidyfile_backend::LocalBackend;
//! use tidyfile_core::Backend;
//!
//! # async fn demo() -> Result<(), tidyfile_core::BackendError> {
//! let backend = LocalBackend::with_defaults();
//! let listing = backend.list_directory(Path::new("/home/user/Downloads")).await?;
//! println!("{} files", listing.total_files);
//! # Ok(())
//! # }
//! ```

mod drives;
mod engine;
mod listing;
mod ops;
mod stats;

pub use engine::EngineClient;
pub use stats::{category_for_extension, ORGANIZER_CATEGORIES};

// Re-export core types for convenience
pub use tidyfile_core::{Backend, BackendError, BackendFuture, SessionConfig};

use std::path::{Path, PathBuf};

use tidyfile_core::{
    AnalyzeSummary, Classification, DirectoryListing, DirectoryStats, DriveInfo, FileEntry,
    MoveOutcome, PathNode,
};

/// [`Backend`] implementation over the local filesystem and engine sidecar.
pub struct LocalBackend {
    config: SessionConfig,
    engine: EngineClient,
}

impl LocalBackend {
    /// Create a backend from an explicit configuration.
    pub fn new(config: SessionConfig) -> Self {
        let engine = EngineClient::new(config.engine_program.clone());
        Self { config, engine }
    }

    /// Create a backend with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SessionConfig::default())
    }

    /// The configuration this backend was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Run a blocking filesystem closure on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, BackendError>
where
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackendError::unavailable(format!("Blocking task failed: {e}")))?
}

impl Backend for LocalBackend {
    fn home_directory(&self) -> BackendFuture<'_, PathBuf> {
        Box::pin(run_blocking(listing::home_directory))
    }

    fn mounted_drives(&self) -> BackendFuture<'_, Vec<DriveInfo>> {
        Box::pin(run_blocking(drives::mounted_drives))
    }

    fn list_folders<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, Vec<PathNode>> {
        let dir = dir.to_path_buf();
        let include_hidden = self.config.include_hidden;
        Box::pin(run_blocking(move || {
            listing::list_folders(&dir, include_hidden)
        }))
    }

    fn list_directory<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, DirectoryListing> {
        let dir = dir.to_path_buf();
        let include_hidden = self.config.include_hidden;
        Box::pin(run_blocking(move || {
            listing::list_directory(&dir, include_hidden)
        }))
    }

    fn analyze_directory<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, AnalyzeSummary> {
        Box::pin(self.engine.analyze(dir))
    }

    fn move_files<'a>(
        &'a self,
        dest: &'a Path,
        classifications: Vec<Classification>,
        apply_renaming: bool,
    ) -> BackendFuture<'a, MoveOutcome> {
        let dest = dest.to_path_buf();
        Box::pin(run_blocking(move || {
            ops::move_files(&dest, &classifications, apply_renaming)
        }))
    }

    fn available_categories(&self) -> BackendFuture<'_, Vec<String>> {
        Box::pin(async {
            Ok(ORGANIZER_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect())
        })
    }

    fn rename_file<'a>(&'a self, path: &'a Path, new_name: &'a str) -> BackendFuture<'a, ()> {
        let path = path.to_path_buf();
        let new_name = new_name.to_string();
        Box::pin(run_blocking(move || ops::rename_file(&path, &new_name)))
    }

    fn delete_file<'a>(&'a self, path: &'a Path) -> BackendFuture<'a, ()> {
        let path = path.to_path_buf();
        Box::pin(run_blocking(move || ops::delete_file(&path)))
    }

    fn search_semantic<'a>(
        &'a self,
        dir: &'a Path,
        query: &'a str,
    ) -> BackendFuture<'a, Vec<Classification>> {
        Box::pin(self.engine.search(dir, query))
    }

    fn files_by_category<'a>(
        &'a self,
        dir: &'a Path,
        category: &'a str,
    ) -> BackendFuture<'a, Vec<FileEntry>> {
        let dir = dir.to_path_buf();
        let category = category.to_string();
        let config = self.config.clone();
        Box::pin(run_blocking(move || {
            stats::files_by_category(&dir, &category, &config)
        }))
    }

    fn directory_stats<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, DirectoryStats> {
        let dir = dir.to_path_buf();
        let config = self.config.clone();
        Box::pin(run_blocking(move || stats::directory_stats(&dir, &config)))
    }
}
