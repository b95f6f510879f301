//! Recording session states.
//!
//! User toggles move the session forward:
//! - Ready -> Recording (start)
//! - Recording -> Processing (stop, waiting for the result)
//! - Processing -> Ready (result or error arrived)
//!
//! The engine's `recording_status` view is authoritative and may force any
//! state (see `SessionEngine`).

use std::fmt;

/// Operational state of the recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing in flight. Ready to start recording.
    Ready,
    /// The engine is capturing audio.
    Recording,
    /// Stop was sent; waiting for the final transcription or an error.
    Processing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Ready => write!(f, "Ready"),
            SessionState::Recording => write!(f, "Recording"),
            SessionState::Processing => write!(f, "Processing"),
        }
    }
}
