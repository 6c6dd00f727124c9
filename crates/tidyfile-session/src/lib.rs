//! Presentation-layer state engine for tidyfile.
//!
//! This crate holds everything between the UI shell and the backend
//! boundary:
//!
//! - [`PathTreeCache`] - the lazily-loaded sidebar folder tree
//! - [`DirectorySession`] - current directory, listing, and back/forward
//!   history
//! - [`ClassificationSet`] - editable results of an analysis or search
//! - [`OrganizeWorkflow`] - the Idle/Browsing/Analyzing/Reviewing/Moving/
//!   Complete state machine
//! - [`Organizer`] - the event-driven facade tying them together over any
//!   [`Backend`](tidyfile_core::Backend)
//!
//! The components never perform I/O themselves; backend calls are spawned
//! tasks whose single completion event is applied synchronously.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tidyfile_core::{MemoryBackend, SessionConfig};
//! use tidyfile_session::Organizer;
//!
//! # async fn demo() -> Result<(), tidyfile_session::SessionError> {
//! let backend = Arc::new(MemoryBackend::new());
//! let mut organizer = Organizer::new(backend, SessionConfig::default());
//!
//! organizer.open("/home/user/Downloads")?;
//! organizer.run_until_settled().await;
//!
//! organizer.analyze()?;
//! organizer.run_until_settled().await;
//! println!("{} suggestions", organizer.review().len());
//! # Ok(())
//! # }
//! ```

mod error;
mod history;
mod organizer;
mod preview;
mod progress;
mod review;
mod tree;
mod workflow;

pub use error::SessionError;
pub use history::{DirectorySession, NavKind};
pub use organizer::{Notice, NoticeLevel, Organizer, SessionEvent, EVENT_CHANNEL_SIZE};
pub use preview::{load_preview, Preview, PreviewError};
pub use progress::{Phase, ProgressSim};
pub use review::{ClassificationSet, DestinationChoice, PendingRename};
pub use tree::{PathTreeCache, TreeAction};
pub use workflow::{OrganizeWorkflow, WorkflowState};
