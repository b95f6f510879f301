//! Rolling transcription history.
//!
//! The panel keeps the most recent transcripts so the user can re-copy
//! one later. The list is capped; pushing onto a full list evicts the
//! oldest entry.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum number of retained transcripts.
pub const HISTORY_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Newest-first transcript list backed by a JSON file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
    /// Open the store at `path`. A missing file means an empty history; a
    /// file longer than the cap is trimmed on load.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut entries: VecDeque<HistoryEntry> = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            VecDeque::new()
        };
        entries.truncate(HISTORY_CAP);
        Ok(Self { path, entries })
    }

    /// Record a transcript at the head of the list, evicting the oldest
    /// entry when full. Persistence is best-effort: a failed write keeps
    /// the in-memory list intact and only logs.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAP);
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, path = %self.path.display(), "History save failed");
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
