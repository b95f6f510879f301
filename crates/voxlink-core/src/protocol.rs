//! Wire protocol spoken over the native channel.
//!
//! The transport delivers one complete JSON object per frame. Inbound
//! messages are tagged by a `type` field, outbound commands by a `command`
//! field. Unknown inbound types deserialize to [`NativeMessage::Unknown`]
//! so the dispatch loop can log and drop them instead of failing.

use serde::{Deserialize, Serialize};

/// A message received from the speech engine process.
///
/// Immutable value; it is dispatched once and never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NativeMessage {
    /// Engine acknowledged the handshake; the channel is live.
    HandshakeAck,
    /// Final recognition result for the current utterance.
    Transcription { text: String },
    /// Provisional preview; each one replaces the previous.
    PartialTranscription { text: String },
    /// Engine's authoritative view of whether it is recording.
    RecordingStatus {
        #[serde(rename = "isRecording")]
        is_recording: bool,
    },
    /// Engine-side failure, identified by a short code string.
    Error { error: String },
    /// Any message type this panel does not understand.
    #[serde(other)]
    Unknown,
}

/// A command sent to the speech engine process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OutboundCommand {
    Handshake,
    StartRecording,
    StopRecording,
    SetModel { model: String },
}
