//! Panel coordinator.
//!
//! Owns the session state machine, the stores, and the injection
//! resolver; consumes [`BridgeEvent`]s from the bridge task and user
//! commands from the frontend, and broadcasts [`PanelEvent`]s back out.
//! All handlers run on the panel's single event loop, one at a time.
//!
//! Ordering matters in [`Panel::on_transcript`]: the session has already
//! returned to `Ready` before history and injection run, so a failing
//! auto-action can never wedge a recording session.

use tokio::sync::{broadcast, mpsc};

use voxlink_bridge::{BridgeEvent, ConnectionState};
use voxlink_core::protocol::OutboundCommand;
use voxlink_inject::{DeliveryTarget, InjectionOutcome, InjectionResolver};
use voxlink_session::{SessionEffect, SessionEngine, SessionState};
use voxlink_store::{HistoryEntry, HistoryStore, SettingsStore};

use crate::events::PanelEvent;

/// Capacity of the UI event broadcast channel.
const EVENT_CAPACITY: usize = 64;

pub struct Panel {
    session: SessionEngine,
    settings: SettingsStore,
    history: HistoryStore,
    resolver: InjectionResolver,
    commands: mpsc::Sender<OutboundCommand>,
    events: broadcast::Sender<PanelEvent>,
    connection: ConnectionState,
}

impl Panel {
    pub fn new(
        settings: SettingsStore,
        history: HistoryStore,
        resolver: InjectionResolver,
        commands: mpsc::Sender<OutboundCommand>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: SessionEngine::new(),
            settings,
            history,
            resolver,
            commands,
            events,
            connection: ConnectionState::Disconnected,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The user's record button.
    ///
    /// While disconnected nothing is sent and the session does not move;
    /// the user gets a toast instead.
    pub async fn toggle_recording(&mut self) {
        let connected = self.connection == ConnectionState::Connected;
        match self.session.toggle(connected) {
            Ok(Some(command)) => {
                self.emit(PanelEvent::SessionChanged(self.session.state()));
                self.send(command).await;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Toggle rejected");
                self.emit(PanelEvent::Toast(
                    "Speech engine is not connected".to_string(),
                ));
            }
        }
    }

    /// Persist a new engine model and, when connected, tell the engine.
    pub async fn set_model(&mut self, model: String) {
        if let Err(e) = self.settings.update(|s| s.model = model.clone()) {
            tracing::warn!(error = %e, "Model setting not persisted");
        }
        if self.connection == ConnectionState::Connected {
            self.send(OutboundCommand::SetModel { model }).await;
        }
    }

    /// Manually deliver the newest history entry to the active field.
    pub async fn paste_last(&mut self) {
        let Some(text) = self.history.entries().next().map(|e| e.text.clone()) else {
            self.emit(PanelEvent::Toast("No transcript to paste".to_string()));
            return;
        };
        self.deliver(&text, &DeliveryTarget::LocalActiveField).await;
    }

    /// Manually send the newest history entry to an external AI surface.
    pub async fn send_last_to(&mut self, provider: &str) {
        let Some(text) = self.history.entries().next().map(|e| e.text.clone()) else {
            self.emit(PanelEvent::Toast("No transcript to send".to_string()));
            return;
        };
        self.deliver(
            &text,
            &DeliveryTarget::ExternalSurface {
                provider: provider.to_string(),
            },
        )
        .await;
    }

    /// Handle one event from the bridge task.
    pub async fn on_bridge_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::StateChanged(state) => {
                self.connection = state;
                self.emit(PanelEvent::ConnectionChanged(state));
                // An in-flight recording can never finish over a dead
                // channel; drop it so the record button stays usable.
                if state != ConnectionState::Connected && self.session.abort() {
                    self.emit(PanelEvent::SessionChanged(self.session.state()));
                    self.emit(PanelEvent::Toast(
                        "Recording dropped: engine connection lost".to_string(),
                    ));
                }
                if state == ConnectionState::Error {
                    self.emit(PanelEvent::Toast(
                        "Speech engine unreachable, giving up".to_string(),
                    ));
                }
            }
            BridgeEvent::Message(message) => {
                let effects = self.session.handle(message);
                self.emit(PanelEvent::SessionChanged(self.session.state()));
                for effect in effects {
                    self.apply_effect(effect).await;
                }
            }
            BridgeEvent::SendFailed { command, error } => {
                tracing::warn!(command = ?command, error = %error, "Bridge send failed");
                self.emit(PanelEvent::Toast(format!("Command failed: {}", error)));
            }
        }
    }

    async fn apply_effect(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::Partial { text } => {
                self.emit(PanelEvent::PartialPreview(text));
            }
            SessionEffect::Notice { message } => {
                self.emit(PanelEvent::Toast(message));
            }
            SessionEffect::Transcript { text } => {
                self.on_transcript(text).await;
            }
        }
    }

    /// A finished transcript: record it, then run the configured
    /// auto-actions. The session is already back in `Ready`.
    async fn on_transcript(&mut self, text: String) {
        self.history.push(HistoryEntry::now(text.clone()));
        self.emit(PanelEvent::Transcript(text.clone()));

        let (auto_paste, auto_send_ai, ai_target) = {
            let s = self.settings.get();
            (s.auto_paste, s.auto_send_ai, s.ai_target.clone())
        };

        if auto_paste {
            self.deliver(&text, &DeliveryTarget::LocalActiveField).await;
        }
        if auto_send_ai {
            self.deliver(
                &text,
                &DeliveryTarget::ExternalSurface {
                    provider: ai_target,
                },
            )
            .await;
        }
    }

    async fn deliver(&mut self, text: &str, target: &DeliveryTarget) {
        let custom_url = self.settings.get().custom_ai_url.clone();
        let attempt = self
            .resolver
            .deliver(text, target, custom_url.as_deref())
            .await;
        if let InjectionOutcome::ClipboardFallback { reason } = &attempt.outcome {
            self.emit(PanelEvent::Toast(format!(
                "Copied to clipboard ({})",
                reason
            )));
        }
    }

    async fn send(&mut self, command: OutboundCommand) {
        if self.commands.send(command).await.is_err() {
            tracing::warn!("Bridge task gone, command dropped");
        }
    }

    fn emit(&self, event: PanelEvent) {
        // No subscribers is fine (e.g. during startup).
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================
