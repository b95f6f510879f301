//! UI-facing event stream.
//!
//! The panel broadcasts these to whatever frontends are attached (the
//! terminal printer today). Slow subscribers that lag simply miss events;
//! every event is a full snapshot of the thing it describes, so a missed
//! one is recovered by the next.

use voxlink_bridge::ConnectionState;
use voxlink_session::SessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// Channel to the engine changed state.
    ConnectionChanged(ConnectionState),
    /// Recording session moved to a new state.
    SessionChanged(SessionState),
    /// Live preview replaced in full.
    PartialPreview(String),
    /// Final transcript, already appended to history.
    Transcript(String),
    /// Transient user-facing notice.
    Toast(String),
}
