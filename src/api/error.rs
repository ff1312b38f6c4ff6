use thiserror::Error;

/// Errors produced at the backend wire boundary.
///
/// Local precondition failures (nothing selected, wrong lifecycle state) are
/// not errors: the controller reports those through its outcome enums so the
/// UI can render them as disabled affordances.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: no response from the backend at all.
    #[error("backend unreachable: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status. The message is surfaced
    /// to the user verbatim.
    #[error("backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },
}

impl ApiError {
    /// True when the backend itself rejected the request (as opposed to the
    /// request never arriving).
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Backend { .. })
    }
}
