//! Current directory and browser-style history.

use std::path::{Path, PathBuf};

use tidyfile_core::DirectoryListing;

/// How a committed listing affects the history stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    /// Fresh navigation: push the old path onto back, clear forward.
    Push,
    /// Back navigation: move the old path onto forward.
    Back,
    /// Forward navigation: move the old path onto back.
    Forward,
    /// Reload of the current path: stacks untouched.
    Refresh,
}

/// Tracks the open directory and back/forward navigation.
///
/// The session never updates optimistically: the current path and listing
/// change only when a successful fetch is committed, so a failed fetch
/// leaves everything, stacks included, exactly as it was.
#[derive(Debug, Default)]
pub struct DirectorySession {
    current: Option<PathBuf>,
    listing: Option<DirectoryListing>,
    back: Vec<PathBuf>,
    forward: Vec<PathBuf>,
}

impl DirectorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.listing.as_ref()
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Where `back()` would land, without popping.
    pub fn back_target(&self) -> Option<&Path> {
        self.back.last().map(PathBuf::as_path)
    }

    /// Where `forward()` would land, without popping.
    pub fn forward_target(&self) -> Option<&Path> {
        self.forward.last().map(PathBuf::as_path)
    }

    /// Commit a successfully fetched listing, adjusting the stacks per
    /// `kind`. Navigating to the path already current touches no stack.
    pub fn commit(&mut self, kind: NavKind, listing: DirectoryListing) {
        let target = listing.path.clone();

        match kind {
            NavKind::Push => {
                if let Some(old) = self.current.take() {
                    if old != target {
                        self.back.push(old);
                        self.forward.clear();
                    }
                }
            }
            NavKind::Back => {
                if self.back.last() == Some(&target) {
                    self.back.pop();
                }
                if let Some(old) = self.current.take() {
                    self.forward.push(old);
                }
            }
            NavKind::Forward => {
                if self.forward.last() == Some(&target) {
                    self.forward.pop();
                }
                if let Some(old) = self.current.take() {
                    self.back.push(old);
                }
            }
            NavKind::Refresh => {}
        }

        self.current = Some(target);
        self.listing = Some(listing);
    }

    /// Forget the open directory and both stacks.
    pub fn clear(&mut self) {
        self.current = None;
        self.listing = None;
        self.back.clear();
        self.forward.clear();
    }
}
