//! Persistence for the Voxlink panel: user settings and recent
//! transcription history, each stored as a small JSON file under the
//! configured data directory.

pub mod error;
pub mod history;
pub mod settings;

pub use error::StoreError;
pub use history::{HistoryEntry, HistoryStore, HISTORY_CAP};
pub use settings::{PanelSettings, SettingsStore};
