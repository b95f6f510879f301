use thiserror::Error;

use voxlink_core::PanelError;

/// Errors produced by the recording session layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Toggle attempted while the bridge is down. Surfaced, no state change.
    #[error("cannot record: not connected to the engine")]
    NotConnected,
}

impl From<SessionError> for PanelError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotConnected => PanelError::NotConnected,
        }
    }
}
