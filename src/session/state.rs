use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of the remote processing session, owned exclusively by the
/// controller.
///
/// Idle is the initial state. Starting is transient (backend warm-up) and is
/// entered only from Idle; it resolves to Running on success or back to Idle
/// on failure. Running returns to Idle only via an explicit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Starting,
    Running,
}

/// Result of a `start` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Session is now Running.
    Started,
    /// A precondition was not met (no file, no devices, or not Idle).
    /// No request was issued and no state changed.
    NotReady,
    /// The request was issued and failed; state reverted to Idle.
    Failed,
}

/// Result of a `stop` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Session is back to Idle.
    Stopped,
    /// There was no Running session to stop; nothing was issued.
    NotRunning,
    /// The request failed; the session stays Running so the user can retry.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-facing message emitted by the controller (the toast stream).
///
/// Warnings are non-fatal (fallback devices installed, config push failed);
/// errors are actionable start/stop failures carrying the backend's wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
