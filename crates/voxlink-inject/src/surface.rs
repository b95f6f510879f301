//! Writable text surfaces.
//!
//! Both insertion flavors satisfy the same narrow contract: put text into
//! the surface, report where the caret ended up. [`FieldBuffer`] models a
//! plain text field with a selection and splices at the cursor;
//! rich/contenteditable surfaces go through the platform insertion command
//! instead (see [`crate::page::PageHost::insert_rich`]).

/// A surface that accepts a text insertion.
pub trait TextSurface {
    /// Insert `text`, returning the byte offset of the caret afterwards.
    fn insert(&mut self, text: &str) -> usize;
}

/// Snapshot of a plain single-line or multi-line text field.
///
/// Offsets are byte indices into `value` and must lie on char boundaries
/// (the host adapter is responsible for converting platform offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBuffer {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl FieldBuffer {
    pub fn new(value: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        Self {
            value: value.into(),
            selection_start,
            selection_end,
        }
    }

    /// Caret position (collapsed selection).
    pub fn caret(&self) -> usize {
        self.selection_start
    }
}

impl TextSurface for FieldBuffer {
    /// Splice `text` over the current selection, not a blind overwrite:
    /// existing content outside the selection is preserved and the caret
    /// lands immediately after the inserted text.
    fn insert(&mut self, text: &str) -> usize {
        let start = self.selection_start.min(self.value.len());
        let end = self.selection_end.clamp(start, self.value.len());

        self.value.replace_range(start..end, text);
        let caret = start + text.len();
        self.selection_start = caret;
        self.selection_end = caret;
        caret
    }
}
