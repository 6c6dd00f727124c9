//! Editable results of a classification pass.

use std::path::PathBuf;

use tidyfile_core::{validate_folder_name, Classification, USER_OVERRIDE_CONFIDENCE};

use crate::error::SessionError;

/// Destination override for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationChoice {
    /// An existing category name.
    Category(String),
    /// The user wants to type a custom folder; the name arrives in a
    /// follow-up [`ClassificationSet::provide_custom_folder`] call.
    NewFolder,
}

/// A rename accepted from the AI suggestion, awaiting confirmation.
///
/// Nothing is touched on disk or in the set until the external rename
/// succeeds. `path` is the source file at staging time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRename {
    pub index: usize,
    pub path: PathBuf,
    pub new_name: String,
}

/// The reviewable set of per-file suggestions.
///
/// `index` is the stable key for the lifetime of one analysis: removals
/// never reassign the surviving entries' indexes.
#[derive(Debug, Default)]
pub struct ClassificationSet {
    entries: Vec<Classification>,
    pending_rename: Option<PendingRename>,
    awaiting_custom: Option<usize>,
}

impl ClassificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with a fresh analysis result.
    ///
    /// Canonical selection default: duplicates start unselected, everything
    /// else keeps the backend's flag.
    pub fn apply_bulk(&mut self, mut entries: Vec<Classification>) {
        for entry in &mut entries {
            if entry.is_duplicate {
                entry.selected = false;
            }
        }
        self.entries = entries;
        self.pending_rename = None;
        self.awaiting_custom = None;
    }

    /// Drop all entries and edit state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending_rename = None;
        self.awaiting_custom = None;
    }

    pub fn entries(&self) -> &[Classification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the given stable index.
    pub fn get(&self, index: usize) -> Option<&Classification> {
        self.entries.iter().find(|e| e.index == index)
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_duplicate).count()
    }

    /// Clones of the selected entries, in set order.
    pub fn selected(&self) -> Vec<Classification> {
        self.entries.iter().filter(|e| e.selected).cloned().collect()
    }

    pub fn pending_rename(&self) -> Option<&PendingRename> {
        self.pending_rename.as_ref()
    }

    /// Flip one entry's participation in the next move.
    pub fn toggle_selection(&mut self, index: usize) -> Result<(), SessionError> {
        let entry = self.entry_mut(index)?;
        entry.selected = !entry.selected;
        Ok(())
    }

    /// Flip the aggregate: if any entry is unselected, select all;
    /// otherwise deselect all.
    pub fn toggle_select_all(&mut self) {
        let all_selected = self.entries.iter().all(|e| e.selected);
        for entry in &mut self.entries {
            entry.selected = !all_selected;
        }
    }

    /// Override one entry's destination.
    ///
    /// Picking a category applies immediately; [`DestinationChoice::NewFolder`]
    /// parks the entry until the folder name arrives. Either way the entry's
    /// confidence is pinned to the user-override sentinel and no other entry
    /// is touched.
    pub fn set_destination(
        &mut self,
        index: usize,
        choice: DestinationChoice,
    ) -> Result<(), SessionError> {
        match choice {
            DestinationChoice::Category(folder) => {
                if folder.is_empty() {
                    return Err(SessionError::validation("Destination cannot be empty"));
                }
                let entry = self.entry_mut(index)?;
                entry.suggested_folder = folder;
                entry.confidence = USER_OVERRIDE_CONFIDENCE;
                self.awaiting_custom = None;
                Ok(())
            }
            DestinationChoice::NewFolder => {
                // Validate the index now so the follow-up cannot dangle.
                self.entry_mut(index)?;
                self.awaiting_custom = Some(index);
                Ok(())
            }
        }
    }

    /// Supply the folder name requested by a prior
    /// [`DestinationChoice::NewFolder`] pick.
    pub fn provide_custom_folder(&mut self, name: &str) -> Result<(), SessionError> {
        let index = self
            .awaiting_custom
            .ok_or_else(|| SessionError::validation("No entry is awaiting a folder name"))?;
        validate_folder_name(name).map_err(SessionError::validation)?;

        let entry = self.entry_mut(index)?;
        entry.suggested_folder = name.to_string();
        entry.confidence = USER_OVERRIDE_CONFIDENCE;
        self.awaiting_custom = None;
        Ok(())
    }

    /// Stage the AI-suggested rename for the entry and return it so the
    /// caller can dispatch the external call. Committing happens separately,
    /// after that call succeeds.
    pub fn accept_suggested_rename(&mut self, index: usize) -> Result<PendingRename, SessionError> {
        let entry = self.entry_ref(index)?;
        let new_name = entry
            .suggested_name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SessionError::validation("Entry has no suggested name"))?;

        let pending = PendingRename {
            index,
            path: entry.filepath.clone(),
            new_name,
        };
        self.pending_rename = Some(pending.clone());
        Ok(pending)
    }

    /// Abandon the staged rename.
    pub fn cancel_rename(&mut self) {
        self.pending_rename = None;
    }

    /// The external rename succeeded: update `filename`/`filepath` and
    /// clear the suggestion.
    pub fn commit_rename(&mut self) -> Result<(), SessionError> {
        let pending = self
            .pending_rename
            .take()
            .ok_or_else(|| SessionError::validation("No rename is pending"))?;

        let entry = self.entry_mut(pending.index)?;
        entry.filepath = match entry.filepath.parent() {
            Some(parent) => parent.join(&pending.new_name),
            None => pending.new_name.clone().into(),
        };
        entry.filename = pending.new_name;
        entry.suggested_name = None;
        Ok(())
    }

    /// Remove the entry after a confirmed external delete. Surviving
    /// entries keep their indexes.
    pub fn remove(&mut self, index: usize) -> Option<Classification> {
        let pos = self.entries.iter().position(|e| e.index == index)?;
        if self.pending_rename.as_ref().is_some_and(|p| p.index == index) {
            self.pending_rename = None;
        }
        if self.awaiting_custom == Some(index) {
            self.awaiting_custom = None;
        }
        Some(self.entries.remove(pos))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut Classification, SessionError> {
        self.entries
            .iter_mut()
            .find(|e| e.index == index)
            .ok_or_else(|| SessionError::validation(format!("No entry with index {index}")))
    }

    fn entry_ref(&self, index: usize) -> Result<&Classification, SessionError> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .ok_or_else(|| SessionError::validation(format!("No entry with index {index}")))
    }
}
