//! Common workflow types

use crate::platform::{AcquisitionFailure, MalformedResponse, PlatformError};
use crate::storage::StoreError;
use crate::utils::config::ConfigError;

/// Observable phase of the distance-tracking cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Ready for a trigger
    Idle,
    /// Waiting for the user's answer to the permission prompt
    AwaitingPermission,
    /// Waiting for the location fix (busy signal shown)
    AwaitingFix,
}

/// What happened to a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new cycle was started
    Started { ticket: u64 },
    /// A cycle is already running; the trigger was dropped
    Ignored,
}

/// Errors creating a tracker
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot open coordinate store: {0}")]
    Store(#[from] StoreError),
}

/// Errors ending a cycle
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The user declined the location permission
    #[error("Permission denied, cannot request a location fix.")]
    PermissionDenied,
    /// The platform answered the permission request with an unexpected shape
    #[error("INTERNAL ERROR: {0}")]
    PermissionQueryMalformed(#[from] MalformedResponse),
    /// The permission prompt could not be shown
    #[error("Permission request failed: {0}")]
    PermissionRequestFailed(#[source] PlatformError),
    /// The fix request could not be issued
    #[error("Location service not available: {0}")]
    LocationServiceUnavailable(#[from] PlatformError),
    /// The fix request was issued but produced no position
    #[error("Location fix failed: {0}")]
    AcquisitionFailed(#[from] AcquisitionFailure),
    /// The previous fix could not be read
    #[error("Could not read the last fix: {0}")]
    PersistenceReadFailed(#[source] StoreError),
    /// The new fix could not be stored
    #[error("Could not store the fix: {0}")]
    PersistenceWriteFailed(#[source] StoreError),
}

impl WorkflowError {
    /// Internal errors indicate a platform contract violation rather than a user-facing condition
    pub fn is_internal(&self) -> bool {
        matches!(self, WorkflowError::PermissionQueryMalformed(_))
    }
}

/// Final result of one cycle
#[derive(Debug)]
pub enum WorkflowResult {
    /// No previous fix existed; the new one was stored
    FirstFixStored,
    /// Distance to the previous fix, truncated to whole meters
    DistanceComputed { meters: u32 },
    /// The cycle ended with an error
    Failed(WorkflowError),
}

impl WorkflowResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, WorkflowResult::Failed(_))
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            WorkflowResult::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn distance_m(&self) -> Option<u32> {
        match self {
            WorkflowResult::DistanceComputed { meters } => Some(*meters),
            _ => None,
        }
    }
}

impl From<WorkflowError> for WorkflowResult {
    fn from(error: WorkflowError) -> Self {
        WorkflowResult::Failed(error)
    }
}
