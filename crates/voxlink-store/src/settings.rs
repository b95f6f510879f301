//! User-facing panel settings, persisted as a single JSON document.
//!
//! Field names in the file keep the historical camelCase keys so existing
//! settings files keep loading; unknown keys are ignored and missing keys
//! fall back to defaults, so older files survive upgrades.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Everything the user can tweak from the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSettings {
    /// Paste finished transcripts into the active field automatically.
    #[serde(rename = "autoPaste", default = "default_true")]
    pub auto_paste: bool,

    /// Forward finished transcripts to the configured AI surface.
    #[serde(rename = "autoSendAI", default)]
    pub auto_send_ai: bool,

    /// Engine model identifier, forwarded verbatim.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL used when `ai_target` is `custom`.
    #[serde(rename = "customAIUrl", default)]
    pub custom_ai_url: Option<String>,

    /// Provider id for automatic AI forwarding.
    #[serde(rename = "aiTarget", default = "default_ai_target")]
    pub ai_target: String,
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "base".to_string()
}

fn default_ai_target() -> String {
    "chatgpt".to_string()
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            auto_paste: true,
            auto_send_ai: false,
            model: default_model(),
            custom_ai_url: None,
            ai_target: default_ai_target(),
        }
    }
}

/// Settings backed by a JSON file. Reads happen against the in-memory
/// copy; every mutation is written through immediately.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: PanelSettings,
}

impl SettingsStore {
    /// Open the store at `path`, falling back to defaults when the file
    /// does not exist yet. A corrupt file is an error, not a silent reset.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            PanelSettings::default()
        };
        Ok(Self { path, settings })
    }

    pub fn get(&self) -> &PanelSettings {
        &self.settings
    }

    /// Apply `mutate` to the settings and persist the result.
    pub fn update(
        &mut self,
        mutate: impl FnOnce(&mut PanelSettings),
    ) -> Result<(), StoreError> {
        mutate(&mut self.settings);
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
