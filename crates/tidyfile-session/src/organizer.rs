//! Event-driven session facade.
//!
//! Dispatch methods validate and spawn backend calls; each spawned task
//! sends exactly one [`SessionEvent`] back over a bounded channel, and
//! [`Organizer::handle_event`] applies the completion synchronously. All
//! state lives here, so there is no locking anywhere in the session layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use tidyfile_core::{
    AnalyzeSummary, Backend, BackendError, Classification, DirectoryListing, MoveOutcome,
    PathNode, SessionConfig,
};

use crate::error::SessionError;
use crate::history::{DirectorySession, NavKind};
use crate::progress::{Phase, ProgressSim};
use crate::review::ClassificationSet;
use crate::tree::{PathTreeCache, TreeAction};
use crate::workflow::{OrganizeWorkflow, WorkflowState};

/// Capacity of the completion-event channel.
pub const EVENT_CHANNEL_SIZE: usize = 64;

/// Completion of one spawned backend call.
///
/// Generations identify the dispatch that spawned the call; results carrying
/// an out-of-date generation are dropped instead of applied.
#[derive(Debug)]
pub enum SessionEvent {
    Listing {
        generation: u64,
        kind: NavKind,
        result: Result<DirectoryListing, BackendError>,
    },
    TreeRoot {
        request: u64,
        path: PathBuf,
        result: Result<Vec<PathNode>, BackendError>,
    },
    TreeChildren {
        generation: u64,
        path: PathBuf,
        result: Result<Vec<PathNode>, BackendError>,
    },
    Analyze {
        generation: u64,
        result: Result<AnalyzeSummary, BackendError>,
    },
    Search {
        generation: u64,
        result: Result<Vec<Classification>, BackendError>,
    },
    Move {
        generation: u64,
        result: Result<MoveOutcome, BackendError>,
    },
    Rename {
        generation: u64,
        result: Result<(), BackendError>,
    },
    Delete {
        generation: u64,
        index: usize,
        result: Result<(), BackendError>,
    },
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient user-facing message produced by a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Which operation the single-flight op slot is occupied by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Analyze,
    Search,
    Move,
    Rename,
    Delete,
}

/// Session facade owning all presentation state.
pub struct Organizer {
    backend: Arc<dyn Backend>,
    config: SessionConfig,
    /// Lazily-loaded sidebar folder tree.
    tree: PathTreeCache,
    /// Current directory, listing, and back/forward history.
    session: DirectorySession,
    /// Editable results of the last analysis or search.
    review: ClassificationSet,
    /// Workflow state machine.
    workflow: OrganizeWorkflow,
    /// Simulated progress for the in-flight analyze/move/search, if any.
    progress: Option<ProgressSim>,
    /// Scan statistics from the last analysis or search.
    summary: Option<AnalyzeSummary>,
    /// Outcome of the last completed move.
    last_move: Option<MoveOutcome>,
    /// Notices not yet taken by the caller.
    notices: Vec<Notice>,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    /// Generation of the most recent listing dispatch.
    listing_gen: u64,
    /// Navigation kind of the in-flight listing fetch, if any.
    pending_listing: Option<NavKind>,
    /// Generation of the most recent op dispatch.
    op_gen: u64,
    /// The in-flight analyze/search/move/rename/delete, if any.
    pending_op: Option<OpKind>,
    /// Latest-wins counter for tree root requests.
    tree_root_req: u64,
    /// Completion events not yet received.
    inflight: usize,
}

impl Organizer {
    pub fn new(backend: Arc<dyn Backend>, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        Self {
            backend,
            config,
            tree: PathTreeCache::new(),
            session: DirectorySession::new(),
            review: ClassificationSet::new(),
            workflow: OrganizeWorkflow::new(),
            progress: None,
            summary: None,
            last_move: None,
            notices: Vec::new(),
            events_tx,
            events_rx,
            listing_gen: 0,
            pending_listing: None,
            op_gen: 0,
            pending_op: None,
            tree_root_req: 0,
            inflight: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> WorkflowState {
        self.workflow.state()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.session.current()
    }

    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.session.listing()
    }

    pub fn session(&self) -> &DirectorySession {
        &self.session
    }

    pub fn tree(&self) -> &PathTreeCache {
        &self.tree
    }

    pub fn review(&self) -> &ClassificationSet {
        &self.review
    }

    /// Mutable access for review edits (selection, destinations, rename
    /// staging). Edits are local; only dispatch methods reach the backend.
    pub fn review_mut(&mut self) -> &mut ClassificationSet {
        &mut self.review
    }

    pub fn summary(&self) -> Option<&AnalyzeSummary> {
        self.summary.as_ref()
    }

    pub fn last_move(&self) -> Option<MoveOutcome> {
        self.last_move
    }

    /// Phase and simulated percentage of the in-flight operation.
    pub fn progress(&self) -> Option<(Phase, u8)> {
        self.progress.as_ref().map(|p| (p.phase(), p.percent()))
    }

    /// No spawned call is still awaited.
    pub fn is_settled(&self) -> bool {
        self.inflight == 0
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain accumulated notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Open `path` as a fresh browse target: fetches its listing and swaps
    /// the sidebar tree root to it.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        self.navigate(path.clone())?;
        self.select_tree_root(path);
        Ok(())
    }

    /// Navigate the file table to `path`.
    pub fn navigate(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        if !self.workflow.can_browse() {
            return Err(SessionError::invalid(self.workflow.state(), "browse"));
        }
        if self.pending_listing.is_some() {
            tracing::debug!("navigation ignored, a listing fetch is already pending");
            return Ok(());
        }
        self.dispatch_listing(NavKind::Push, path.into());
        Ok(())
    }

    /// Navigate to the previous directory in history. No-op when the
    /// back-stack is empty.
    pub fn go_back(&mut self) -> Result<(), SessionError> {
        if !self.workflow.can_browse() {
            return Err(SessionError::invalid(self.workflow.state(), "browse"));
        }
        if self.pending_listing.is_some() {
            tracing::debug!("back ignored, a listing fetch is already pending");
            return Ok(());
        }
        let Some(target) = self.session.back_target() else {
            return Ok(());
        };
        self.dispatch_listing(NavKind::Back, target.to_path_buf());
        Ok(())
    }

    /// Navigate forward again after going back. No-op when the
    /// forward-stack is empty.
    pub fn go_forward(&mut self) -> Result<(), SessionError> {
        if !self.workflow.can_browse() {
            return Err(SessionError::invalid(self.workflow.state(), "browse"));
        }
        if self.pending_listing.is_some() {
            tracing::debug!("forward ignored, a listing fetch is already pending");
            return Ok(());
        }
        let Some(target) = self.session.forward_target() else {
            return Ok(());
        };
        self.dispatch_listing(NavKind::Forward, target.to_path_buf());
        Ok(())
    }

    /// Re-fetch the current directory without touching history.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        if !self.workflow.can_browse() {
            return Err(SessionError::invalid(self.workflow.state(), "browse"));
        }
        if self.pending_listing.is_some() {
            tracing::debug!("refresh ignored, a listing fetch is already pending");
            return Ok(());
        }
        let Some(current) = self.session.current() else {
            return Err(SessionError::NoDirectory);
        };
        self.dispatch_listing(NavKind::Refresh, current.to_path_buf());
        Ok(())
    }

    /// Swap the sidebar tree to a new root. Latest request wins; the
    /// previous root stays intact until the new one loads successfully.
    pub fn select_tree_root(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.tree_root_req += 1;
        let request = self.tree_root_req;
        self.inflight += 1;

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.list_folders(&path).await;
            let _ = tx.send(SessionEvent::TreeRoot { request, path, result }).await;
        });
    }

    /// Expand or collapse a tree node, fetching children on first expand.
    pub fn toggle_folder(&mut self, node: &PathNode) {
        match self.tree.toggle_expand(node) {
            TreeAction::None => {}
            TreeAction::Fetch { path, generation } => {
                self.inflight += 1;
                let backend = Arc::clone(&self.backend);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = backend.list_folders(&path).await;
                    let _ = tx
                        .send(SessionEvent::TreeChildren { generation, path, result })
                        .await;
                });
            }
        }
    }

    /// Run the classification engine over the current directory.
    pub fn analyze(&mut self) -> Result<(), SessionError> {
        if self.pending_op.is_some() || self.pending_listing.is_some() {
            tracing::debug!("analyze ignored, another call is already pending");
            return Ok(());
        }
        let Some(dir) = self.session.current() else {
            return Err(SessionError::NoDirectory);
        };
        let dir = dir.to_path_buf();
        self.workflow.analyze_dispatched()?;

        let generation = self.dispatch_op(OpKind::Analyze, Some(Phase::Analyze));
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.analyze_directory(&dir).await;
            let _ = tx.send(SessionEvent::Analyze { generation, result }).await;
        });
        Ok(())
    }

    /// Semantic search over the current directory; results are reviewed
    /// exactly like analysis results.
    pub fn search(&mut self, query: &str) -> Result<(), SessionError> {
        if self.pending_op.is_some() || self.pending_listing.is_some() {
            tracing::debug!("search ignored, another call is already pending");
            return Ok(());
        }
        if query.trim().is_empty() {
            return Err(SessionError::validation("Search query cannot be empty"));
        }
        let Some(dir) = self.session.current() else {
            return Err(SessionError::NoDirectory);
        };
        let dir = dir.to_path_buf();
        self.workflow.search_dispatched()?;

        let generation = self.dispatch_op(OpKind::Search, Some(Phase::Search));
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let result = backend.search_semantic(&dir, &query).await;
            let _ = tx.send(SessionEvent::Search { generation, result }).await;
        });
        Ok(())
    }

    /// Move the selected entries into their suggested folders under `dest`
    /// (the current directory when `None`).
    pub fn move_selected(
        &mut self,
        dest: Option<PathBuf>,
        apply_renaming: bool,
    ) -> Result<(), SessionError> {
        if self.pending_op.is_some() {
            tracing::debug!("move ignored, another call is already pending");
            return Ok(());
        }
        let selected = self.review.selected();
        if self.workflow.state() == WorkflowState::Reviewing && selected.is_empty() {
            return Err(SessionError::validation("No files are selected"));
        }
        let dest = match dest.or_else(|| self.session.current().map(Path::to_path_buf)) {
            Some(dest) => dest,
            None => return Err(SessionError::NoDirectory),
        };
        self.workflow.move_dispatched()?;

        let generation = self.dispatch_op(OpKind::Move, Some(Phase::Move));
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.move_files(&dest, selected, apply_renaming).await;
            let _ = tx.send(SessionEvent::Move { generation, result }).await;
        });
        Ok(())
    }

    /// Throw away the review and return to browsing; the current directory
    /// is re-listed.
    pub fn discard_review(&mut self) -> Result<(), SessionError> {
        self.workflow.review_discarded()?;
        self.review.clear();
        self.summary = None;
        self.progress = None;
        if let Some(current) = self.session.current() {
            self.dispatch_listing(NavKind::Refresh, current.to_path_buf());
        }
        Ok(())
    }

    /// Perform the staged rename of a review entry through the backend.
    /// The entry is only updated after the backend reports success.
    pub fn confirm_rename(&mut self, index: usize) -> Result<(), SessionError> {
        if self.workflow.state() != WorkflowState::Reviewing {
            return Err(SessionError::invalid(self.workflow.state(), "rename"));
        }
        if self.pending_op.is_some() {
            tracing::debug!("rename ignored, another call is already pending");
            return Ok(());
        }
        let pending = self.review.accept_suggested_rename(index)?;

        let generation = self.dispatch_op(OpKind::Rename, None);
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.rename_file(&pending.path, &pending.new_name).await;
            let _ = tx.send(SessionEvent::Rename { generation, result }).await;
        });
        Ok(())
    }

    /// Permanently delete a review entry's file through the backend. The
    /// entry leaves the set only after the backend reports success.
    pub fn delete_entry(&mut self, index: usize) -> Result<(), SessionError> {
        if self.workflow.state() != WorkflowState::Reviewing {
            return Err(SessionError::invalid(self.workflow.state(), "delete"));
        }
        if self.pending_op.is_some() {
            tracing::debug!("delete ignored, another call is already pending");
            return Ok(());
        }
        let path = match self.review.get(index) {
            Some(entry) => entry.filepath.clone(),
            None => return Err(SessionError::validation(format!("No entry with index {index}"))),
        };

        let generation = self.dispatch_op(OpKind::Delete, None);
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.delete_file(&path).await;
            let _ = tx
                .send(SessionEvent::Delete { generation, index, result })
                .await;
        });
        Ok(())
    }

    /// Return to Idle, clearing every component. In-flight results are
    /// discarded by the generation bumps when they eventually arrive.
    pub fn reset(&mut self) {
        self.workflow.reset();
        self.session.clear();
        self.tree.clear();
        self.review.clear();
        self.summary = None;
        self.progress = None;
        self.last_move = None;
        self.notices.clear();
        self.listing_gen += 1;
        self.pending_listing = None;
        self.op_gen += 1;
        self.pending_op = None;
        self.tree_root_req += 1;
    }

    /// Apply one completion event.
    pub fn handle_event(&mut self, event: SessionEvent) {
        self.inflight = self.inflight.saturating_sub(1);
        match event {
            SessionEvent::Listing { generation, kind, result } => {
                if generation != self.listing_gen {
                    tracing::debug!(generation, "stale listing result dropped");
                    return;
                }
                self.pending_listing = None;
                match result {
                    Ok(listing) => {
                        tracing::debug!(path = %listing.path.display(), "listing loaded");
                        self.session.commit(kind, listing);
                        self.workflow.browsing_entered();
                    }
                    Err(err) => self.push_error(format!("Could not open folder: {err}")),
                }
            }
            SessionEvent::TreeRoot { request, path, result } => {
                if request != self.tree_root_req {
                    tracing::debug!(request, "superseded tree root dropped");
                    return;
                }
                match result {
                    Ok(nodes) => self.tree.install_root(path, nodes),
                    Err(err) => self.push_error(format!("Could not load folders: {err}")),
                }
            }
            SessionEvent::TreeChildren { generation, path, result } => match result {
                Ok(nodes) => self.tree.apply_children(generation, &path, nodes),
                Err(err) => {
                    self.tree.abandon_fetch(generation, &path);
                    self.push_error(format!(
                        "Could not load folders under {}: {err}",
                        path.display()
                    ));
                }
            },
            SessionEvent::Analyze { generation, result } => {
                if !self.op_event_current(generation) {
                    return;
                }
                self.finish_progress();
                match result {
                    Ok(mut summary) => {
                        self.review.apply_bulk(std::mem::take(&mut summary.classifications));
                        tracing::info!(
                            files = summary.total_files,
                            duplicates = summary.total_duplicates,
                            "analysis complete"
                        );
                        self.push_info(format!(
                            "Analyzed {} files in {:.1}s",
                            summary.total_files, summary.scan_time
                        ));
                        self.summary = Some(summary);
                        self.workflow.analyze_resolved(true);
                    }
                    Err(err) => {
                        self.workflow.analyze_resolved(false);
                        self.push_error(format!("Analysis failed: {err}"));
                    }
                }
            }
            SessionEvent::Search { generation, result } => {
                if !self.op_event_current(generation) {
                    return;
                }
                self.finish_progress();
                match result {
                    Ok(results) => {
                        let mut summary = AnalyzeSummary::from_search(results);
                        self.review.apply_bulk(std::mem::take(&mut summary.classifications));
                        self.push_info(format!("Found {} matching files", summary.total_files));
                        self.summary = Some(summary);
                        self.workflow.analyze_resolved(true);
                    }
                    Err(err) => {
                        self.workflow.analyze_resolved(false);
                        self.push_error(format!("Search failed: {err}"));
                    }
                }
            }
            SessionEvent::Move { generation, result } => {
                if !self.op_event_current(generation) {
                    return;
                }
                self.finish_progress();
                match result {
                    Ok(outcome) => {
                        tracing::info!(
                            successful = outcome.successful,
                            failed = outcome.failed,
                            skipped = outcome.skipped,
                            "move complete"
                        );
                        self.last_move = Some(outcome);
                        self.workflow.move_resolved(true);
                        self.push_info(format!(
                            "Moved {} files ({} failed, {} skipped)",
                            outcome.successful, outcome.failed, outcome.skipped
                        ));
                    }
                    Err(err) => {
                        self.workflow.move_resolved(false);
                        self.push_error(format!("Move failed: {err}"));
                    }
                }
            }
            SessionEvent::Rename { generation, result } => {
                if !self.op_event_current(generation) {
                    return;
                }
                match result {
                    Ok(()) => {
                        let new_name = self.review.pending_rename().map(|p| p.new_name.clone());
                        match self.review.commit_rename() {
                            Ok(()) => {
                                if let Some(name) = new_name {
                                    self.push_info(format!("Renamed to {name}"));
                                }
                            }
                            Err(err) => self.push_error(err.to_string()),
                        }
                    }
                    // The staged rename is kept so the user can retry.
                    Err(err) => self.push_error(format!("Rename failed: {err}")),
                }
            }
            SessionEvent::Delete { generation, index, result } => {
                if !self.op_event_current(generation) {
                    return;
                }
                match result {
                    Ok(()) => {
                        if let Some(entry) = self.review.remove(index) {
                            self.push_info(format!("Deleted {}", entry.filename));
                        }
                    }
                    Err(err) => self.push_error(format!("Delete failed: {err}")),
                }
            }
        }
    }

    /// Receive and apply events until no spawned call is outstanding.
    pub async fn run_until_settled(&mut self) {
        while self.inflight > 0 {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            self.handle_event(event);
        }
    }

    fn dispatch_listing(&mut self, kind: NavKind, path: PathBuf) {
        self.listing_gen += 1;
        let generation = self.listing_gen;
        self.pending_listing = Some(kind);
        self.inflight += 1;
        tracing::debug!(path = %path.display(), ?kind, "listing dispatched");

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.list_directory(&path).await;
            let _ = tx.send(SessionEvent::Listing { generation, kind, result }).await;
        });
    }

    fn dispatch_op(&mut self, kind: OpKind, phase: Option<Phase>) -> u64 {
        self.op_gen += 1;
        self.pending_op = Some(kind);
        self.progress = phase.map(ProgressSim::start);
        self.inflight += 1;
        self.op_gen
    }

    /// Clear the op slot if `generation` is current; stale results are
    /// dropped.
    fn op_event_current(&mut self, generation: u64) -> bool {
        if generation != self.op_gen || self.pending_op.is_none() {
            tracing::debug!(generation, "stale operation result dropped");
            return false;
        }
        self.pending_op = None;
        true
    }

    fn finish_progress(&mut self) {
        if let Some(progress) = self.progress.as_mut() {
            progress.finish();
        }
    }

    fn push_info(&mut self, message: String) {
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            message,
        });
    }

    fn push_error(&mut self, message: String) {
        tracing::warn!(%message, "operation failed");
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message,
        });
    }
}
