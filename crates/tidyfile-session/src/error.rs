//! Session-level error taxonomy.

use thiserror::Error;

use tidyfile_core::BackendError;

use crate::workflow::WorkflowState;

/// Errors surfaced by the session components.
///
/// Immediate rejections (gating, validation) are returned from the dispatch
/// methods; failures of in-flight backend calls arrive later as notices.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The action is not permitted in the current workflow state.
    #[error("Cannot {action} in the {state} state")]
    InvalidTransition {
        state: WorkflowState,
        action: &'static str,
    },

    /// The request was rejected before any backend call was made.
    #[error("{message}")]
    Validation { message: String },

    /// The operation needs an open directory and none is set.
    #[error("No directory is open")]
    NoDirectory,

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SessionError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn invalid(state: WorkflowState, action: &'static str) -> Self {
        Self::InvalidTransition { state, action }
    }
}
