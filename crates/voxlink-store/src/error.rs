use thiserror::Error;
use voxlink_core::PanelError;

/// Errors from the settings/history stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for PanelError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => PanelError::Io(e),
            other => PanelError::Store(other.to_string()),
        }
    }
}
