use thiserror::Error;

use voxlink_core::PanelError;

/// Errors produced by host-platform collaborators during injection.
///
/// These never escape the resolver: any of them degrades a delivery to the
/// clipboard fallback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InjectError {
    #[error("page host error: {0}")]
    Page(String),

    #[error("tab host error: {0}")]
    Tabs(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl From<InjectError> for PanelError {
    fn from(err: InjectError) -> Self {
        PanelError::Injection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_panel_injection_variant() {
        let err: PanelError = InjectError::Tabs("tab vanished".to_string()).into();
        assert!(matches!(err, PanelError::Injection(_)));
        assert!(err.to_string().contains("tab vanished"));
    }
}
