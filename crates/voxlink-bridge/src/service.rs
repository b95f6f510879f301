//! Async drive loop for the bridge connection.
//!
//! Runs as one task per panel: pulls outbound commands from an mpsc channel,
//! reads inbound frames, routes messages onward as [`BridgeEvent`]s, and
//! performs the reconnect-with-backoff dance when the channel drops. Inbound
//! messages are dispatched in order, one at a time; the backoff sleep and
//! the whole loop are cancelled by the shutdown `Notify`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;

use voxlink_core::protocol::{NativeMessage, OutboundCommand};

use crate::connection::{Connection, ConnectionState};
use crate::error::BridgeError;

/// How long a freshly opened channel may wait for `handshake_ack` before
/// it is treated as lost and fed into the backoff path.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Events the bridge reports to the panel.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// Connection lifecycle changed.
    StateChanged(ConnectionState),
    /// An inbound message for the session state machine.
    Message(NativeMessage),
    /// A command could not be sent; surfaced immediately to the user.
    SendFailed { command: OutboundCommand, error: String },
}

/// Drive the connection until shutdown or until the panel drops its channels.
pub async fn run(
    mut connection: Connection,
    mut commands: mpsc::Receiver<OutboundCommand>,
    events: mpsc::Sender<BridgeEvent>,
    shutdown: Arc<Notify>,
) {
    let mut handshake_deadline: Option<Instant> = None;

    loop {
        // (Re)establish the channel unless the connection is terminal.
        while !connection.has_transport() && connection.state() != ConnectionState::Error {
            match connection.connect().await {
                Ok(()) => {
                    handshake_deadline = Some(Instant::now() + HANDSHAKE_TIMEOUT);
                    let _ = events
                        .send(BridgeEvent::StateChanged(connection.state()))
                        .await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Connect attempt failed");
                    if !backoff_or_park(&mut connection, &events, &shutdown).await {
                        return;
                    }
                }
            }
        }

        enum Step {
            Shutdown,
            Cmd(Option<OutboundCommand>),
            Inbound(Result<Option<NativeMessage>, BridgeError>),
            AckTimeout,
        }

        let awaiting_ack =
            connection.has_transport() && connection.state() == ConnectionState::Connecting;
        let ack_deadline = handshake_deadline.unwrap_or_else(Instant::now);

        let step = tokio::select! {
            _ = shutdown.notified() => Step::Shutdown,
            cmd = commands.recv() => Step::Cmd(cmd),
            inbound = connection.recv(), if connection.has_transport() => Step::Inbound(inbound),
            _ = tokio::time::sleep_until(ack_deadline), if awaiting_ack => Step::AckTimeout,
        };

        match step {
            Step::Shutdown => {
                tracing::info!("Bridge shutting down");
                return;
            }
            Step::Cmd(None) => {
                tracing::debug!("Panel dropped its command channel, bridge stopping");
                return;
            }
            Step::Cmd(Some(command)) => {
                if let Err(e) = connection.send(&command).await {
                    tracing::warn!(command = ?command, error = %e, "Send failed");
                    let _ = events
                        .send(BridgeEvent::SendFailed {
                            command,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
            Step::Inbound(Ok(Some(NativeMessage::Unknown))) => {
                tracing::warn!("Unknown native message type dropped");
            }
            Step::Inbound(Ok(Some(message))) => {
                let before = connection.state();
                connection.observe(&message);
                if connection.state() != before {
                    if connection.state() == ConnectionState::Connected {
                        handshake_deadline = None;
                    }
                    let _ = events
                        .send(BridgeEvent::StateChanged(connection.state()))
                        .await;
                }
                let _ = events.send(BridgeEvent::Message(message)).await;
            }
            Step::Inbound(Ok(None)) => {
                tracing::warn!("Engine channel closed");
                handshake_deadline = None;
                if !backoff_or_park(&mut connection, &events, &shutdown).await {
                    return;
                }
            }
            Step::Inbound(Err(e)) => {
                tracing::warn!(error = %e, "Engine channel error");
                handshake_deadline = None;
                if !backoff_or_park(&mut connection, &events, &shutdown).await {
                    return;
                }
            }
            Step::AckTimeout => {
                tracing::warn!(
                    timeout_secs = HANDSHAKE_TIMEOUT.as_secs(),
                    "Handshake never acknowledged, dropping the channel"
                );
                handshake_deadline = None;
                if !backoff_or_park(&mut connection, &events, &shutdown).await {
                    return;
                }
            }
        }
    }
}

/// Handle a channel loss: either wait out the backoff delay (interruptible
/// by shutdown) or park the connection in terminal `Error`.
///
/// Returns `false` when shutdown was requested during the wait.
async fn backoff_or_park(
    connection: &mut Connection,
    events: &mpsc::Sender<BridgeEvent>,
    shutdown: &Notify,
) -> bool {
    match connection.on_disconnect() {
        Some(delay) => {
            let _ = events
                .send(BridgeEvent::StateChanged(ConnectionState::Disconnected))
                .await;
            tokio::select! {
                _ = tokio::time::sleep(delay) => true,
                _ = shutdown.notified() => false,
            }
        }
        None => {
            let _ = events
                .send(BridgeEvent::StateChanged(ConnectionState::Error))
                .await;
            true
        }
    }
}
