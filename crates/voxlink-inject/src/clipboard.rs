//! Clipboard seam - the universal delivery fallback.

use crate::error::InjectError;

/// Puts text on the system clipboard.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), InjectError>;
}

/// System clipboard via `arboard`.
///
/// A fresh handle per call: clipboard access is rare (fallback path only)
/// and some platforms dislike long-lived handles.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), InjectError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| InjectError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| InjectError::Clipboard(e.to_string()))?;
        tracing::debug!(text_len = text.len(), "Text copied to clipboard");
        Ok(())
    }
}
