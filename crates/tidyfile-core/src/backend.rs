//! Backend capability contract.
//!
//! The organizer consumes the backend through this object-safe trait so
//! the state components can be exercised against [`MemoryBackend`] instead
//! of a real filesystem and engine process. Every call is asynchronous,
//! fallible, and returns a typed result; there is no cancellation primitive.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;

use crate::error::BackendError;
use crate::model::{
    AnalyzeSummary, Classification, DirectoryListing, DirectoryStats, DriveInfo, FileEntry,
    MoveOutcome, PathNode,
};

/// Boxed future returned by every backend call.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Asynchronous capability interface to the organizing backend.
///
/// `Send + Sync` because completions are awaited from spawned tasks that
/// share the backend behind an `Arc`.
pub trait Backend: Send + Sync {
    /// Resolve the user's home directory.
    fn home_directory(&self) -> BackendFuture<'_, PathBuf>;

    /// Enumerate mounted locations offered as browse roots.
    fn mounted_drives(&self) -> BackendFuture<'_, Vec<DriveInfo>>;

    /// List the immediate child folders of `dir` (folders only, one level).
    fn list_folders<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, Vec<PathNode>>;

    /// List the contents of `dir`.
    fn list_directory<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, DirectoryListing>;

    /// Run the classification engine over `dir`.
    fn analyze_directory<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, AnalyzeSummary>;

    /// Move the selected classifications under `dest`, optionally applying
    /// suggested renames. Unselected entries are skipped, not failed.
    fn move_files<'a>(
        &'a self,
        dest: &'a Path,
        classifications: Vec<Classification>,
        apply_renaming: bool,
    ) -> BackendFuture<'a, MoveOutcome>;

    /// Category names the organizer may offer as destinations.
    fn available_categories(&self) -> BackendFuture<'_, Vec<String>>;

    /// Rename `path` to `new_name` within its parent directory.
    fn rename_file<'a>(&'a self, path: &'a Path, new_name: &'a str) -> BackendFuture<'a, ()>;

    /// Permanently delete a file or directory.
    fn delete_file<'a>(&'a self, path: &'a Path) -> BackendFuture<'a, ()>;

    /// Semantic search over `dir` for `query`.
    fn search_semantic<'a>(
        &'a self,
        dir: &'a Path,
        query: &'a str,
    ) -> BackendFuture<'a, Vec<Classification>>;

    /// Files under `dir` whose extension maps to `category`.
    fn files_by_category<'a>(
        &'a self,
        dir: &'a Path,
        category: &'a str,
    ) -> BackendFuture<'a, Vec<FileEntry>>;

    /// Storage dashboard data for `dir`.
    fn directory_stats<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, DirectoryStats>;
}

/// In-memory [`Backend`] for tests.
///
/// Responses are scripted per path; failures can be queued per call name
/// and are consumed in order. Call counts and mutating calls are recorded
/// for assertions.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    home: PathBuf,
    drives: Vec<DriveInfo>,
    folders: HashMap<PathBuf, Vec<PathNode>>,
    listings: HashMap<PathBuf, DirectoryListing>,
    analyses: HashMap<PathBuf, AnalyzeSummary>,
    search_results: Vec<Classification>,
    categories: Vec<String>,
    category_files: HashMap<String, Vec<FileEntry>>,
    stats: HashMap<PathBuf, DirectoryStats>,
    move_outcome: MoveOutcome,
    failures: HashMap<&'static str, Vec<BackendError>>,
    calls: HashMap<&'static str, usize>,
    renames: Vec<(PathBuf, String)>,
    deletes: Vec<PathBuf>,
    moves: Vec<(PathBuf, Vec<Classification>, bool)>,
}

impl MemoryBackend {
    /// Create an empty backend with a placeholder home directory.
    pub fn new() -> Self {
        let backend = Self::default();
        backend.inner.lock().unwrap().home = PathBuf::from("/home/user");
        backend
    }

    pub fn set_home(&self, path: impl Into<PathBuf>) {
        self.inner.lock().unwrap().home = path.into();
    }

    pub fn set_drives(&self, drives: Vec<DriveInfo>) {
        self.inner.lock().unwrap().drives = drives;
    }

    pub fn insert_folders(&self, dir: impl Into<PathBuf>, nodes: Vec<PathNode>) {
        self.inner.lock().unwrap().folders.insert(dir.into(), nodes);
    }

    pub fn insert_listing(&self, listing: DirectoryListing) {
        let mut state = self.inner.lock().unwrap();
        state.listings.insert(listing.path.clone(), listing);
    }

    pub fn insert_analysis(&self, dir: impl Into<PathBuf>, summary: AnalyzeSummary) {
        self.inner.lock().unwrap().analyses.insert(dir.into(), summary);
    }

    pub fn set_search_results(&self, results: Vec<Classification>) {
        self.inner.lock().unwrap().search_results = results;
    }

    pub fn set_categories(&self, categories: Vec<String>) {
        self.inner.lock().unwrap().categories = categories;
    }

    pub fn insert_category_files(&self, category: impl Into<String>, files: Vec<FileEntry>) {
        let mut state = self.inner.lock().unwrap();
        state.category_files.insert(category.into(), files);
    }

    pub fn insert_stats(&self, dir: impl Into<PathBuf>, stats: DirectoryStats) {
        self.inner.lock().unwrap().stats.insert(dir.into(), stats);
    }

    pub fn set_move_outcome(&self, outcome: MoveOutcome) {
        self.inner.lock().unwrap().move_outcome = outcome;
    }

    /// Queue a failure for the next invocation of `call` (by method name).
    pub fn fail_next(&self, call: &'static str, error: BackendError) {
        let mut state = self.inner.lock().unwrap();
        state.failures.entry(call).or_default().push(error);
    }

    /// Number of times `call` was invoked.
    pub fn calls(&self, call: &'static str) -> usize {
        self.inner.lock().unwrap().calls.get(call).copied().unwrap_or(0)
    }

    /// Recorded `(path, new_name)` rename requests.
    pub fn renames(&self) -> Vec<(PathBuf, String)> {
        self.inner.lock().unwrap().renames.clone()
    }

    /// Recorded delete requests.
    pub fn deletes(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().deletes.clone()
    }

    /// Recorded `(dest, classifications, apply_renaming)` move requests.
    pub fn moves(&self) -> Vec<(PathBuf, Vec<Classification>, bool)> {
        self.inner.lock().unwrap().moves.clone()
    }
}

impl MemoryState {
    fn enter(&mut self, call: &'static str) -> Result<(), BackendError> {
        *self.calls.entry(call).or_insert(0) += 1;
        if let Some(queue) = self.failures.get_mut(call) {
            if !queue.is_empty() {
                return Err(queue.remove(0));
            }
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn home_directory(&self) -> BackendFuture<'_, PathBuf> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("home_directory")?;
            Ok(state.home.clone())
        })
    }

    fn mounted_drives(&self) -> BackendFuture<'_, Vec<DriveInfo>> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("mounted_drives")?;
            Ok(state.drives.clone())
        })
    }

    fn list_folders<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, Vec<PathNode>> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("list_folders")?;
            Ok(state.folders.get(dir).cloned().unwrap_or_default())
        })
    }

    fn list_directory<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, DirectoryListing> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("list_directory")?;
            state
                .listings
                .get(dir)
                .cloned()
                .ok_or_else(|| BackendError::not_found(dir))
        })
    }

    fn analyze_directory<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, AnalyzeSummary> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("analyze_directory")?;
            state
                .analyses
                .get(dir)
                .cloned()
                .ok_or_else(|| BackendError::not_found(dir))
        })
    }

    fn move_files<'a>(
        &'a self,
        dest: &'a Path,
        classifications: Vec<Classification>,
        apply_renaming: bool,
    ) -> BackendFuture<'a, MoveOutcome> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("move_files")?;
            state
                .moves
                .push((dest.to_path_buf(), classifications, apply_renaming));
            Ok(state.move_outcome)
        })
    }

    fn available_categories(&self) -> BackendFuture<'_, Vec<String>> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("available_categories")?;
            Ok(state.categories.clone())
        })
    }

    fn rename_file<'a>(&'a self, path: &'a Path, new_name: &'a str) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("rename_file")?;
            state.renames.push((path.to_path_buf(), new_name.to_string()));
            Ok(())
        })
    }

    fn delete_file<'a>(&'a self, path: &'a Path) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("delete_file")?;
            state.deletes.push(path.to_path_buf());
            Ok(())
        })
    }

    fn search_semantic<'a>(
        &'a self,
        _dir: &'a Path,
        _query: &'a str,
    ) -> BackendFuture<'a, Vec<Classification>> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("search_semantic")?;
            Ok(state.search_results.clone())
        })
    }

    fn files_by_category<'a>(
        &'a self,
        _dir: &'a Path,
        category: &'a str,
    ) -> BackendFuture<'a, Vec<FileEntry>> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("files_by_category")?;
            Ok(state.category_files.get(category).cloned().unwrap_or_default())
        })
    }

    fn directory_stats<'a>(&'a self, dir: &'a Path) -> BackendFuture<'a, DirectoryStats> {
        Box::pin(async move {
            let mut state = self.inner.lock().unwrap();
            state.enter("directory_stats")?;
            state
                .stats
                .get(dir)
                .cloned()
                .ok_or_else(|| BackendError::not_found(dir))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::{Context, Poll, Waker};

    /// The memory backend never actually suspends, so a single poll with a
    /// no-op waker is enough to drive its futures in tests.
    fn resolve<T>(fut: BackendFuture<'_, T>) -> Result<T, BackendError> {
        let mut fut = fut;
        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(value) => value,
            Poll::Pending => unreachable!("memory backend futures are immediate"),
        }
    }

    #[test]
    fn test_scripted_listing_and_call_count() {
        let backend = MemoryBackend::new();
        backend.insert_listing(DirectoryListing {
            path: "/data".into(),
            entries: Vec::new(),
            total_files: 0,
            total_folders: 0,
        });

        let listing = resolve(backend.list_directory(Path::new("/data"))).unwrap();
        assert_eq!(listing.path, PathBuf::from("/data"));
        assert_eq!(backend.calls("list_directory"), 1);

        let err = resolve(backend.list_directory(Path::new("/other"))).unwrap_err();
        assert!(matches!(err, BackendError::PathNotFound { .. }));
        assert_eq!(backend.calls("list_directory"), 2);
    }

    #[test]
    fn test_queued_failure_is_consumed_once() {
        let backend = MemoryBackend::new();
        backend.fail_next("home_directory", BackendError::unavailable("offline"));

        assert!(resolve(backend.home_directory()).is_err());
        assert_eq!(
            resolve(backend.home_directory()).unwrap(),
            PathBuf::from("/home/user")
        );
    }

    #[test]
    fn test_mutations_are_recorded() {
        let backend = MemoryBackend::new();
        resolve(backend.rename_file(Path::new("/a/old.txt"), "new.txt")).unwrap();
        resolve(backend.delete_file(Path::new("/a/gone.txt"))).unwrap();

        assert_eq!(backend.renames(), vec![("/a/old.txt".into(), "new.txt".into())]);
        assert_eq!(backend.deletes(), vec![PathBuf::from("/a/gone.txt")]);
    }
}
