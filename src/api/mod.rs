//! Application-facing API
//!
//! The [`DistanceTracker`] drives one distance cycle per trigger and reports to a [`HostUi`].
//! Results are formatted for display by [`DistanceFormatter`].

pub mod formatting;
pub mod host;
pub mod types;
pub mod workflow;

pub use formatting::{DistanceFormatter, NumberLocale};
pub use host::{Dialog, DialogKind, HostUi, RecordingHost, ACK_LABEL};
pub use types::{SetupError, TriggerOutcome, WorkflowError, WorkflowResult, WorkflowState};
pub use workflow::{Collaborators, DistanceTracker};
