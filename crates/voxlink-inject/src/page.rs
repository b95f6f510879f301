//! Host seam for the page the user is currently looking at.

use async_trait::async_trait;

use crate::error::InjectError;
use crate::surface::FieldBuffer;

/// What is focused in the active page right now.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusedElement {
    /// A plain text field with its current value and selection.
    Field(FieldBuffer),
    /// A rich/contenteditable surface; insertion must go through the
    /// platform command so formatting and the undo stack stay consistent.
    Rich,
    /// Something focused that accepts no text.
    NonText,
}

/// Capabilities of the page hosting the local injection target.
///
/// Implemented by the platform adapter; the resolver treats every call as
/// an opaque async operation that may fail.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Snapshot of the focused element, or `None` when nothing is focused.
    async fn focused_element(&self) -> Result<Option<FocusedElement>, InjectError>;

    /// Write the edited value and caret back into the focused field and
    /// fire the platform "value changed" notification so reactive
    /// frameworks observing the field re-render.
    async fn commit_field(&self, field: &FieldBuffer) -> Result<(), InjectError>;

    /// Insert into the focused rich surface via the platform
    /// text-insertion command.
    async fn insert_rich(&self, text: &str) -> Result<(), InjectError>;
}
