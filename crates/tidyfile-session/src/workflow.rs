//! The organize pipeline state machine.

use strum::{AsRefStr, Display, EnumIter};

use crate::error::SessionError;

/// Phase of the organize pipeline. Exactly one is active at a time.
///
/// The state is a hard gate: invoking an operation from the wrong state is
/// rejected by the workflow itself, not merely hidden by a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, AsRefStr)]
pub enum WorkflowState {
    /// No folder selected yet.
    #[default]
    Idle,
    /// A folder is open and its listing is available.
    Browsing,
    /// An analyze or semantic-search call is in flight.
    Analyzing,
    /// Classifications are loaded and editable.
    Reviewing,
    /// A bulk move call is in flight.
    Moving,
    /// The move finished; counts are available.
    Complete,
}

/// State machine coordinating browse, analyze, review, and move.
///
/// Transitions mutate in place and invalid ones return a typed error; the
/// resolution handlers tolerate stale calls so a dropped completion can
/// never wedge the machine.
#[derive(Debug, Default)]
pub struct OrganizeWorkflow {
    state: WorkflowState,
}

impl OrganizeWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Whether navigation (open/back/forward/refresh) may be dispatched.
    pub fn can_browse(&self) -> bool {
        matches!(self.state, WorkflowState::Idle | WorkflowState::Browsing)
    }

    /// A directory listing was committed; the session is browsing.
    pub fn browsing_entered(&mut self) {
        self.state = WorkflowState::Browsing;
    }

    /// An analyze call was dispatched. Only valid while browsing.
    pub fn analyze_dispatched(&mut self) -> Result<(), SessionError> {
        if self.state != WorkflowState::Browsing {
            return Err(SessionError::invalid(self.state, "analyze"));
        }
        self.state = WorkflowState::Analyzing;
        Ok(())
    }

    /// A semantic-search call was dispatched. Shares the analyzing phase.
    pub fn search_dispatched(&mut self) -> Result<(), SessionError> {
        if self.state != WorkflowState::Browsing {
            return Err(SessionError::invalid(self.state, "search"));
        }
        self.state = WorkflowState::Analyzing;
        Ok(())
    }

    /// The in-flight analyze/search resolved.
    pub fn analyze_resolved(&mut self, ok: bool) {
        if self.state != WorkflowState::Analyzing {
            tracing::debug!(state = %self.state, "analyze resolution ignored");
            return;
        }
        self.state = if ok {
            WorkflowState::Reviewing
        } else {
            WorkflowState::Browsing
        };
    }

    /// The user abandoned the review; back to browsing.
    pub fn review_discarded(&mut self) -> Result<(), SessionError> {
        if self.state != WorkflowState::Reviewing {
            return Err(SessionError::invalid(self.state, "discard the review"));
        }
        self.state = WorkflowState::Browsing;
        Ok(())
    }

    /// A bulk move was dispatched. Only valid while reviewing.
    pub fn move_dispatched(&mut self) -> Result<(), SessionError> {
        if self.state != WorkflowState::Reviewing {
            return Err(SessionError::invalid(self.state, "move files"));
        }
        self.state = WorkflowState::Moving;
        Ok(())
    }

    /// The in-flight move resolved. Failure returns to the review with the
    /// selection intact.
    pub fn move_resolved(&mut self, ok: bool) {
        if self.state != WorkflowState::Moving {
            tracing::debug!(state = %self.state, "move resolution ignored");
            return;
        }
        self.state = if ok {
            WorkflowState::Complete
        } else {
            WorkflowState::Reviewing
        };
    }

    /// Drop back to the initial state from anywhere.
    pub fn reset(&mut self) {
        self.state = WorkflowState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut wf = OrganizeWorkflow::new();
        assert_eq!(wf.state(), WorkflowState::Idle);

        wf.browsing_entered();
        assert_eq!(wf.state(), WorkflowState::Browsing);

        wf.analyze_dispatched().unwrap();
        assert_eq!(wf.state(), WorkflowState::Analyzing);

        wf.analyze_resolved(true);
        assert_eq!(wf.state(), WorkflowState::Reviewing);

        wf.move_dispatched().unwrap();
        assert_eq!(wf.state(), WorkflowState::Moving);

        wf.move_resolved(true);
        assert_eq!(wf.state(), WorkflowState::Complete);

        wf.reset();
        assert_eq!(wf.state(), WorkflowState::Idle);
    }

    #[test]
    fn test_failures_roll_back() {
        let mut wf = OrganizeWorkflow::new();
        wf.browsing_entered();

        wf.analyze_dispatched().unwrap();
        wf.analyze_resolved(false);
        assert_eq!(wf.state(), WorkflowState::Browsing);

        wf.analyze_dispatched().unwrap();
        wf.analyze_resolved(true);
        wf.move_dispatched().unwrap();
        wf.move_resolved(false);
        assert_eq!(wf.state(), WorkflowState::Reviewing);
    }

    #[test]
    fn test_hard_gates() {
        let mut wf = OrganizeWorkflow::new();

        // Analyze requires Browsing.
        assert!(matches!(
            wf.analyze_dispatched(),
            Err(SessionError::InvalidTransition { .. })
        ));

        // Move requires Reviewing.
        wf.browsing_entered();
        assert!(wf.move_dispatched().is_err());
        assert_eq!(wf.state(), WorkflowState::Browsing);

        // Search shares the analyze gate.
        wf.analyze_dispatched().unwrap();
        assert!(wf.search_dispatched().is_err());
    }

    #[test]
    fn test_discard_relists() {
        let mut wf = OrganizeWorkflow::new();
        wf.browsing_entered();
        wf.analyze_dispatched().unwrap();
        wf.analyze_resolved(true);

        wf.review_discarded().unwrap();
        assert_eq!(wf.state(), WorkflowState::Browsing);

        assert!(wf.review_discarded().is_err());
    }

    #[test]
    fn test_stale_resolution_is_ignored() {
        let mut wf = OrganizeWorkflow::new();
        wf.browsing_entered();
        wf.analyze_resolved(true);
        assert_eq!(wf.state(), WorkflowState::Browsing);

        wf.move_resolved(true);
        assert_eq!(wf.state(), WorkflowState::Browsing);
    }

    #[test]
    fn test_can_browse() {
        let mut wf = OrganizeWorkflow::new();
        assert!(wf.can_browse());
        wf.browsing_entered();
        assert!(wf.can_browse());
        wf.analyze_dispatched().unwrap();
        assert!(!wf.can_browse());
        wf.analyze_resolved(true);
        assert!(!wf.can_browse());
    }
}
