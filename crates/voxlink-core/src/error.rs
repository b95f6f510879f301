use thiserror::Error;

/// Top-level error type for the Voxlink panel.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for PanelError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PanelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bridge error: {0}")]
    Bridge(String),

    #[error("Command attempted without a live channel")]
    NotConnected,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Injection error: {0}")]
    Injection(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PanelError {
    fn from(err: toml::de::Error) -> Self {
        PanelError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PanelError {
    fn from(err: toml::ser::Error) -> Self {
        PanelError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        PanelError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Voxlink operations.
pub type Result<T> = std::result::Result<T, PanelError>;
