//! GUI host interface
//!
//! The host shows a busy indicator while a fix is outstanding and presents every cycle result
//! as a modal dialog with a single acknowledgement action.

use crate::api::formatting::DistanceFormatter;
use crate::api::types::WorkflowResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Label of the single dialog action
pub const ACK_LABEL: &str = "Ok";

/// Dialog category, selects the title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Result,
    Error,
}

impl DialogKind {
    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::Result => "Result",
            DialogKind::Error => "Error",
        }
    }
}

/// Modal message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub message: String,
}

impl Dialog {
    /// Build the dialog reporting `result`
    pub fn for_result(result: &WorkflowResult, formatter: &DistanceFormatter) -> Self {
        match result {
            WorkflowResult::FirstFixStored => Self {
                kind: DialogKind::Result,
                message: "First fix stored.".to_string(),
            },
            WorkflowResult::DistanceComputed { meters } => Self {
                kind: DialogKind::Result,
                message: format!("Distance to last fix: {}", formatter.format(*meters)),
            },
            WorkflowResult::Failed(error) => Self {
                kind: DialogKind::Error,
                message: error.to_string(),
            },
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn ack_label(&self) -> &'static str {
        ACK_LABEL
    }
}

/// UI surface driven by the tracker; may be called from any thread
pub trait HostUi: Send + Sync {
    /// Show or hide the busy indicator
    fn set_busy(&self, busy: bool);

    /// Present a modal dialog
    fn show_dialog(&self, dialog: Dialog);
}

#[derive(Debug, Default)]
struct Recording {
    busy: bool,
    busy_changes: Vec<bool>,
    dialogs: Vec<Dialog>,
}

/// Host that records every call, for tests and headless embedding
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Every `set_busy` argument in call order
    pub fn busy_changes(&self) -> Vec<bool> {
        self.lock().busy_changes.clone()
    }

    pub fn dialogs(&self) -> Vec<Dialog> {
        self.lock().dialogs.clone()
    }

    pub fn last_dialog(&self) -> Option<Dialog> {
        self.lock().dialogs.last().cloned()
    }
}

impl HostUi for RecordingHost {
    fn set_busy(&self, busy: bool) {
        let mut recording = self.lock();
        recording.busy = busy;
        recording.busy_changes.push(busy);
    }

    fn show_dialog(&self, dialog: Dialog) {
        self.lock().dialogs.push(dialog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::formatting::NumberLocale;
    use crate::api::types::WorkflowError;

    #[test]
    fn test_result_dialogs() {
        let formatter = DistanceFormatter::new(NumberLocale::german());

        let dialog = Dialog::for_result(&WorkflowResult::FirstFixStored, &formatter);
        assert_eq!(dialog.title(), "Result");
        assert_eq!(dialog.message, "First fix stored.");
        assert_eq!(dialog.ack_label(), "Ok");

        let dialog = Dialog::for_result(
            &WorkflowResult::DistanceComputed { meters: 877_464 },
            &formatter,
        );
        assert_eq!(dialog.kind, DialogKind::Result);
        assert_eq!(dialog.message, "Distance to last fix: 877 km");
    }

    #[test]
    fn test_error_dialog() {
        let formatter = DistanceFormatter::default();
        let dialog = Dialog::for_result(
            &WorkflowResult::Failed(WorkflowError::PermissionDenied),
            &formatter,
        );

        assert_eq!(dialog.title(), "Error");
        assert_eq!(dialog.message, "Permission denied, cannot request a location fix.");
    }

    #[test]
    fn test_recording_host() {
        let host = RecordingHost::new();
        host.set_busy(true);
        host.set_busy(false);
        host.show_dialog(Dialog {
            kind: DialogKind::Result,
            message: "x".to_string(),
        });

        assert!(!host.is_busy());
        assert_eq!(host.busy_changes(), vec![true, false]);
        assert_eq!(host.dialogs().len(), 1);
        assert_eq!(host.last_dialog().unwrap().message, "x");
    }
}
