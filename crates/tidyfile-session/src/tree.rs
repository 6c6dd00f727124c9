//! Lazily-loaded folder tree cache.
//!
//! The tree is a flat map keyed by path plus a separate expansion set, not
//! a linked node graph; any subtree can be loaded or dropped independently.
//! The cache itself performs no I/O: toggles report whether a fetch is
//! needed and the owner applies results back.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use tidyfile_core::PathNode;

/// What the owner must do after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    /// State already updated; nothing to fetch.
    None,
    /// Fetch the children of `path` and apply them with `generation`.
    Fetch { path: PathBuf, generation: u64 },
}

/// Per-path cache of child folders with expand/collapse state.
///
/// Children, once fetched, are never invalidated by the cache itself; only
/// installing a new root clears them. Staleness is the accepted trade for
/// never re-fetching an already-loaded subtree.
#[derive(Debug, Default)]
pub struct PathTreeCache {
    root_path: Option<PathBuf>,
    roots: Vec<PathNode>,
    children: IndexMap<PathBuf, Vec<PathNode>>,
    expanded: HashSet<PathBuf>,
    loading: HashSet<PathBuf>,
    generation: u64,
}

impl PathTreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The path whose children form the top level, if a root is installed.
    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    /// Top-level nodes of the current root.
    pub fn roots(&self) -> &[PathNode] {
        &self.roots
    }

    /// Cached children of `path`, if fetched.
    pub fn children_of(&self, path: &Path) -> Option<&[PathNode]> {
        self.children.get(path).map(Vec::as_slice)
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    pub fn is_loading(&self, path: &Path) -> bool {
        self.loading.contains(path)
    }

    /// Generation of the current root; results from an older generation
    /// must be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Expand or collapse `node`.
    ///
    /// Collapsing keeps the cached children for a fast re-expand. Expanding
    /// an uncached node with `has_children` issues exactly one fetch; while
    /// that fetch is in flight further toggles are no-ops.
    pub fn toggle_expand(&mut self, node: &PathNode) -> TreeAction {
        let path = node.path.as_path();

        if self.loading.contains(path) {
            return TreeAction::None;
        }
        if self.expanded.remove(path) {
            return TreeAction::None;
        }
        if self.children.contains_key(path) {
            self.expanded.insert(path.to_path_buf());
            return TreeAction::None;
        }
        if !node.has_children {
            return TreeAction::None;
        }

        self.loading.insert(path.to_path_buf());
        TreeAction::Fetch {
            path: path.to_path_buf(),
            generation: self.generation,
        }
    }

    /// Store fetched children and expand the path.
    ///
    /// Results carrying a stale generation are dropped.
    pub fn apply_children(&mut self, generation: u64, path: &Path, nodes: Vec<PathNode>) {
        if generation != self.generation {
            tracing::debug!(path = %path.display(), "stale tree children dropped");
            return;
        }
        self.loading.remove(path);
        self.children.insert(path.to_path_buf(), nodes);
        self.expanded.insert(path.to_path_buf());
    }

    /// A child fetch failed; leave the path collapsed and uncached so a
    /// later toggle can retry.
    pub fn abandon_fetch(&mut self, generation: u64, path: &Path) {
        if generation != self.generation {
            return;
        }
        self.loading.remove(path);
    }

    /// Install a freshly fetched root listing, dropping every cached
    /// subtree and all expansion state.
    ///
    /// Callers fetch first and install only on success, so a failed root
    /// switch retains the previous tree in full.
    pub fn install_root(&mut self, path: PathBuf, nodes: Vec<PathNode>) {
        self.root_path = Some(path);
        self.roots = nodes;
        self.children.clear();
        self.expanded.clear();
        self.loading.clear();
        self.generation += 1;
    }

    /// Drop the whole tree.
    pub fn clear(&mut self) {
        self.root_path = None;
        self.roots.clear();
        self.children.clear();
        self.expanded.clear();
        self.loading.clear();
        self.generation += 1;
    }
}
