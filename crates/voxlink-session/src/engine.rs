//! Session engine coordinating user intent with the engine's view.
//!
//! The engine owns the session state exclusively and is driven from the
//! panel's single event loop: `toggle` for user intent, `handle` for each
//! inbound native message. Handlers run to completion before the next
//! message, so there are no interleaving hazards.

use uuid::Uuid;

use voxlink_core::protocol::{NativeMessage, OutboundCommand};

use crate::codes;
use crate::error::SessionError;
use crate::state::SessionState;

/// UI-facing outcome of handling a native message.
///
/// The panel turns these into history appends, injections, and toasts;
/// none of them can change session state after the fact.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Final transcript: display it, append to history, run auto-actions.
    Transcript { text: String },
    /// Live preview replaced (never appended).
    Partial { text: String },
    /// Transient user-facing notice.
    Notice { message: String },
}

/// The recording session state machine.
///
/// Exactly one instance per panel; created at panel start and only ever
/// reset to `Ready`, never destroyed.
#[derive(Debug)]
pub struct SessionEngine {
    state: SessionState,
    partial: Option<String>,
    recording_id: Option<Uuid>,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Ready,
            partial: None,
            recording_id: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current live preview, if any.
    pub fn partial(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    /// Handle the user's record toggle.
    ///
    /// Fails with `NotConnected` (no state change, nothing sent) while the
    /// bridge is down. Otherwise returns the command to send:
    /// `start_recording` from `Ready`, `stop_recording` from `Recording`,
    /// and `None` while `Processing` (must wait for the result).
    pub fn toggle(&mut self, connected: bool) -> Result<Option<OutboundCommand>, SessionError> {
        if !connected {
            return Err(SessionError::NotConnected);
        }

        match self.state {
            SessionState::Ready => {
                let id = Uuid::new_v4();
                self.recording_id = Some(id);
                self.state = SessionState::Recording;
                tracing::info!(recording_id = %id, "Recording started");
                Ok(Some(OutboundCommand::StartRecording))
            }
            SessionState::Recording => {
                self.state = SessionState::Processing;
                tracing::info!(recording_id = ?self.recording_id, "Recording stopped, processing");
                Ok(Some(OutboundCommand::StopRecording))
            }
            SessionState::Processing => {
                tracing::debug!("Toggle ignored while processing");
                Ok(None)
            }
        }
    }

    /// Handle one inbound native message, returning UI-facing effects.
    pub fn handle(&mut self, message: NativeMessage) -> Vec<SessionEffect> {
        match message {
            NativeMessage::HandshakeAck | NativeMessage::Unknown => Vec::new(),
            NativeMessage::PartialTranscription { text } => {
                self.partial = Some(text.clone());
                vec![SessionEffect::Partial { text }]
            }
            NativeMessage::RecordingStatus { is_recording } => {
                self.sync_recording(is_recording);
                Vec::new()
            }
            NativeMessage::Transcription { text } => self.finish(text),
            NativeMessage::Error { error } => {
                let message = codes::describe(&error);
                tracing::warn!(code = %error, "Engine reported an error");
                self.reset_to_ready();
                vec![SessionEffect::Notice { message }]
            }
        }
    }

    /// Synchronize to the engine's authoritative recording flag.
    ///
    /// Handles engine-initiated stops (silence cut, spontaneous stop): this
    /// view always wins over locally tracked state. An engine stop without a
    /// result emits no transcript.
    fn sync_recording(&mut self, is_recording: bool) {
        let target = if is_recording {
            SessionState::Recording
        } else {
            SessionState::Ready
        };
        if self.state == target {
            return;
        }

        tracing::info!(from = %self.state, to = %target, "Session synced to engine recording status");
        if target == SessionState::Recording && self.recording_id.is_none() {
            self.recording_id = Some(Uuid::new_v4());
        }
        if target == SessionState::Ready {
            self.recording_id = None;
            self.partial = None;
        }
        self.state = target;
    }

    /// Finalize a transcription.
    ///
    /// Returns to `Ready` unconditionally so the panel can never get stuck
    /// in `Processing`, whatever the downstream auto-actions do. Blank text
    /// is a no-op: warning logged, no transcript effect.
    fn finish(&mut self, text: String) -> Vec<SessionEffect> {
        let id = self.recording_id.take();
        self.partial = None;
        self.state = SessionState::Ready;

        if text.trim().is_empty() {
            tracing::warn!(recording_id = ?id, "Blank transcription discarded");
            return Vec::new();
        }

        tracing::info!(recording_id = ?id, text_len = text.len(), "Transcription finalized");
        vec![SessionEffect::Transcript { text }]
    }

    /// Abandon the in-flight recording because the engine channel is gone.
    ///
    /// A result can never arrive over a dead channel, so `Recording` and
    /// `Processing` both drop straight back to `Ready` (preview cleared)
    /// and the record button stays usable. No-op while already `Ready`.
    /// Returns whether anything was dropped.
    pub fn abort(&mut self) -> bool {
        if self.state == SessionState::Ready {
            return false;
        }
        tracing::warn!(
            from = %self.state,
            recording_id = ?self.recording_id,
            "Session aborted, engine channel lost"
        );
        self.reset_to_ready();
        true
    }

    fn reset_to_ready(&mut self) {
        self.recording_id = None;
        self.partial = None;
        self.state = SessionState::Ready;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_ready() {
        let engine = SessionEngine::new();
        assert_eq!(engine.state(), SessionState::Ready);
        assert!(engine.partial().is_none());
    }

    #[test]
    fn test_toggle_not_connected_changes_nothing() {
        let mut engine = SessionEngine::new();
        let result = engine.toggle(false);
        assert!(matches!(result, Err(SessionError::NotConnected)));
        assert_eq!(engine.state(), SessionState::Ready);

        // Same while recording: no stop is sent, no state change.
        engine.toggle(true).unwrap();
        let result = engine.toggle(false);
        assert!(matches!(result, Err(SessionError::NotConnected)));
        assert_eq!(engine.state(), SessionState::Recording);
    }

    #[test]
    fn test_toggle_ready_starts_recording() {
        let mut engine = SessionEngine::new();
        let cmd = engine.toggle(true).unwrap();
        assert_eq!(cmd, Some(OutboundCommand::StartRecording));
        assert_eq!(engine.state(), SessionState::Recording);
    }

    #[test]
    fn test_toggle_recording_stops_into_processing() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        let cmd = engine.toggle(true).unwrap();
        assert_eq!(cmd, Some(OutboundCommand::StopRecording));
        assert_eq!(engine.state(), SessionState::Processing);
    }

    #[test]
    fn test_toggle_is_noop_while_processing() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        engine.toggle(true).unwrap();

        let cmd = engine.toggle(true).unwrap();
        assert_eq!(cmd, None);
        assert_eq!(engine.state(), SessionState::Processing);
    }

    #[test]
    fn test_transcription_finishes_cycle() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        engine.toggle(true).unwrap();

        let effects = engine.handle(NativeMessage::Transcription {
            text: "hello world".to_string(),
        });
        assert_eq!(
            effects,
            vec![SessionEffect::Transcript {
                text: "hello world".to_string()
            }]
        );
        assert_eq!(engine.state(), SessionState::Ready);
    }

    #[test]
    fn test_blank_transcription_is_noop() {
        for blank in ["", "   ", "\n\t "] {
            let mut engine = SessionEngine::new();
            engine.toggle(true).unwrap();
            engine.toggle(true).unwrap();

            let effects = engine.handle(NativeMessage::Transcription {
                text: blank.to_string(),
            });
            assert!(effects.is_empty(), "blank {:?} must emit nothing", blank);
            assert_eq!(engine.state(), SessionState::Ready);
        }
    }

    #[test]
    fn test_partial_replaces_preview() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();

        engine.handle(NativeMessage::PartialTranscription {
            text: "hel".to_string(),
        });
        assert_eq!(engine.partial(), Some("hel"));

        let effects = engine.handle(NativeMessage::PartialTranscription {
            text: "hello".to_string(),
        });
        // Replaced, not appended; state untouched.
        assert_eq!(engine.partial(), Some("hello"));
        assert_eq!(
            effects,
            vec![SessionEffect::Partial {
                text: "hello".to_string()
            }]
        );
        assert_eq!(engine.state(), SessionState::Recording);
    }

    #[test]
    fn test_partial_is_idempotent() {
        let mut engine = SessionEngine::new();
        engine.handle(NativeMessage::PartialTranscription {
            text: "same".to_string(),
        });
        engine.handle(NativeMessage::PartialTranscription {
            text: "same".to_string(),
        });
        assert_eq!(engine.partial(), Some("same"));
    }

    #[test]
    fn test_engine_initiated_stop_returns_to_ready_without_transcript() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        assert_eq!(engine.state(), SessionState::Recording);

        // VAD silence cut: engine stops on its own.
        let effects = engine.handle(NativeMessage::RecordingStatus { is_recording: false });
        assert!(effects.is_empty());
        assert_eq!(engine.state(), SessionState::Ready);
        assert!(engine.partial().is_none());
    }

    #[test]
    fn test_recording_status_always_wins() {
        let mut engine = SessionEngine::new();

        // Engine says recording even though we never toggled.
        engine.handle(NativeMessage::RecordingStatus { is_recording: true });
        assert_eq!(engine.state(), SessionState::Recording);

        // And back again, even out of Processing.
        engine.toggle(true).unwrap();
        assert_eq!(engine.state(), SessionState::Processing);
        engine.handle(NativeMessage::RecordingStatus { is_recording: true });
        assert_eq!(engine.state(), SessionState::Recording);
    }

    #[test]
    fn test_recording_status_matching_state_is_noop() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        engine.handle(NativeMessage::PartialTranscription {
            text: "keep me".to_string(),
        });

        engine.handle(NativeMessage::RecordingStatus { is_recording: true });
        assert_eq!(engine.state(), SessionState::Recording);
        // A matching status must not clear the preview.
        assert_eq!(engine.partial(), Some("keep me"));
    }

    #[test]
    fn test_error_maps_code_and_returns_to_ready() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        engine.toggle(true).unwrap();

        let effects = engine.handle(NativeMessage::Error {
            error: "transcription_failed".to_string(),
        });
        assert_eq!(
            effects,
            vec![SessionEffect::Notice {
                message: "Transcription failed, please try again".to_string()
            }]
        );
        assert_eq!(engine.state(), SessionState::Ready);
    }

    #[test]
    fn test_unknown_error_code_passes_through_raw() {
        let mut engine = SessionEngine::new();
        let effects = engine.handle(NativeMessage::Error {
            error: "weird_code_42".to_string(),
        });
        assert_eq!(
            effects,
            vec![SessionEffect::Notice {
                message: "weird_code_42".to_string()
            }]
        );
    }

    #[test]
    fn test_handshake_ack_and_unknown_emit_nothing() {
        let mut engine = SessionEngine::new();
        assert!(engine.handle(NativeMessage::HandshakeAck).is_empty());
        assert!(engine.handle(NativeMessage::Unknown).is_empty());
        assert_eq!(engine.state(), SessionState::Ready);
    }

    #[test]
    fn test_full_cycle_then_restart() {
        let mut engine = SessionEngine::new();

        engine.toggle(true).unwrap();
        engine.toggle(true).unwrap();
        engine.handle(NativeMessage::Transcription {
            text: "first".to_string(),
        });
        assert_eq!(engine.state(), SessionState::Ready);

        // Second cycle works from scratch.
        let cmd = engine.toggle(true).unwrap();
        assert_eq!(cmd, Some(OutboundCommand::StartRecording));
        assert_eq!(engine.state(), SessionState::Recording);
    }

    #[test]
    fn test_abort_drops_processing_back_to_ready() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        engine.handle(NativeMessage::PartialTranscription {
            text: "half a sent".to_string(),
        });
        engine.toggle(true).unwrap();
        assert_eq!(engine.state(), SessionState::Processing);

        assert!(engine.abort());
        assert_eq!(engine.state(), SessionState::Ready);
        assert!(engine.partial().is_none());

        // Recordable again right away.
        let cmd = engine.toggle(true).unwrap();
        assert_eq!(cmd, Some(OutboundCommand::StartRecording));
    }

    #[test]
    fn test_abort_while_ready_is_noop() {
        let mut engine = SessionEngine::new();
        assert!(!engine.abort());
        assert_eq!(engine.state(), SessionState::Ready);
    }

    #[test]
    fn test_transcription_clears_preview() {
        let mut engine = SessionEngine::new();
        engine.toggle(true).unwrap();
        engine.handle(NativeMessage::PartialTranscription {
            text: "partial".to_string(),
        });
        engine.toggle(true).unwrap();
        engine.handle(NativeMessage::Transcription {
            text: "final".to_string(),
        });
        assert!(engine.partial().is_none());
    }
}
