//! Error taxonomy for session operations.
//!
//! Expected failure modes (busy, capacity, destroyed-session use) are
//! ordinary variants callers must match on, not panics. `NotFound` is
//! deliberately absent: an unknown session id surfaces as `None` from the
//! manager lookup, since a missing entry is an answer rather than a fault.

use displayd_core::{InvalidNamespaceError, SessionId};
use thiserror::Error;

use crate::application::gestures::InjectionError;
use crate::infrastructure::capture::CaptureError;
use crate::infrastructure::surface::AllocationError;
use crate::infrastructure::sysops::DelegateError;

/// Error type for session creation and session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A caller-supplied value was rejected before reaching any delegate
    /// (bad settings namespace, unresolvable package, …).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The physical display is already bound to a session.
    #[error("physical display is already controlled")]
    PhysicalDisplayBusy,

    /// Creating one more headless session would exceed the configured cap.
    #[error("maximum number of sessions ({0}) reached")]
    CapacityExceeded(usize),

    /// The operation arrived after the session's one-way destroy.
    #[error("session {0} has been destroyed")]
    SessionDestroyed(SessionId),

    /// Surface allocation was refused by the display backend.
    #[error("surface allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    /// Frame capture failed; includes the retryable no-frame case.
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The input pipeline rejected a synthetic event.
    #[error("input injection failed: {0}")]
    Injection(#[from] InjectionError),

    /// The system operations delegate reported a failure or timed out.
    #[error("system delegate failed: {0}")]
    Delegate(#[from] DelegateError),
}

impl From<InvalidNamespaceError> for SessionError {
    fn from(err: InvalidNamespaceError) -> Self {
        SessionError::InvalidArgument(err.to_string())
    }
}
