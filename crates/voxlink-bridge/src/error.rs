use thiserror::Error;

use voxlink_core::PanelError;

/// Errors produced by the bridge connection layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// A command was attempted without a live, handshaken channel.
    /// Rejected locally; no I/O is performed.
    #[error("not connected to the engine process")]
    NotConnected,

    /// The engine process could not be launched.
    #[error("failed to spawn engine process: {0}")]
    Spawn(String),

    /// The channel closed while an operation was in flight.
    #[error("channel to the engine process closed")]
    Closed,

    /// A frame exceeded the wire-format size cap.
    #[error("frame too large: {size} bytes exceeds {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl From<BridgeError> for PanelError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotConnected => PanelError::NotConnected,
            other => PanelError::Bridge(other.to_string()),
        }
    }
}
