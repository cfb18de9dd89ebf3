//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;

use gridline_core::{Entity, LoadState, MutationOutcome, Snapshot};

/// Index of a view tab, in configuration order.
pub type ViewIdx = usize;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }

    /// Toast for a finished write.
    pub fn from_outcome(outcome: &MutationOutcome) -> Self {
        if outcome.success {
            Self::success(outcome.message.clone())
        } else {
            Self::error(outcome.message.clone())
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecords { view: ViewIdx, ids: Vec<String> },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteRecords { ids, .. } => match ids.as_slice() {
                [id] => write!(f, "Delete record {id}?"),
                _ => write!(f, "Delete {} records?", ids.len()),
            },
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchView(ViewIdx),
    NextView,
    PrevView,

    // ── Data Events (from controller streams) ─────────────────────
    DataUpdated(ViewIdx, Snapshot<Entity>),
    LoadStateChanged(ViewIdx, LoadState),

    // ── Search ────────────────────────────────────────────────────
    /// Debounced search term ready to apply.
    SearchSettled(ViewIdx, String),

    // ── Data Commands ─────────────────────────────────────────────
    RequestRefresh(ViewIdx),
    RequestDelete(ViewIdx, Vec<String>),
    ClearSelection(ViewIdx),

    // ── Confirm Dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
