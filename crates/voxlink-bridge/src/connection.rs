//! Connection state machine with bounded linear backoff.
//!
//! Lifecycle: `Disconnected --connect()--> Connecting --handshake_ack-->
//! Connected --channel closed--> Disconnected`, retrying with a linearly
//! increasing delay until the attempt cap is hit, at which point the
//! connection parks in the terminal `Error` state.

use std::fmt;
use std::time::Duration;

use voxlink_core::protocol::{NativeMessage, OutboundCommand};

use crate::error::BridgeError;
use crate::transport::{Connector, Transport};

/// Lifecycle state of the channel to the engine process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No channel open. Ready to connect.
    Disconnected,
    /// Channel open, handshake sent, waiting for the acknowledgement.
    Connecting,
    /// Handshake acknowledged; commands may be sent.
    Connected,
    /// Reconnection cap exhausted. Terminal until an explicit `reset`.
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Error => write!(f, "Error"),
        }
    }
}

/// Reconnection policy: attempt `n` (1-indexed) waits `base_delay * n`.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl ReconnectPolicy {
    /// Delay scheduled before retry number `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Manager for the single logical channel to the engine process.
///
/// Owns the transport and all connection state exclusively; every mutation
/// happens through its own methods. One instance exists per panel.
pub struct Connection {
    connector: Box<dyn Connector>,
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
    reconnect_attempts: u32,
    policy: ReconnectPolicy,
}

impl Connection {
    pub fn new(connector: Box<dyn Connector>, policy: ReconnectPolicy) -> Self {
        Self {
            connector,
            transport: None,
            state: ConnectionState::Disconnected,
            reconnect_attempts: 0,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Open the channel and immediately send the handshake command.
    ///
    /// No-op when already `Connecting` or `Connected`. A transport-open or
    /// handshake-write failure leaves the connection `Disconnected`; the
    /// caller feeds it into the backoff path via [`Connection::on_disconnect`].
    pub async fn connect(&mut self) -> Result<(), BridgeError> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                tracing::debug!(state = %self.state, "connect() ignored, channel already open");
                return Ok(());
            }
            ConnectionState::Disconnected | ConnectionState::Error => {}
        }

        self.state = ConnectionState::Connecting;
        tracing::info!(attempt = self.reconnect_attempts, "Connecting to engine process");

        let mut transport = match self.connector.connect().await {
            Ok(t) => t,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        if let Err(e) = transport.send(&OutboundCommand::Handshake).await {
            self.state = ConnectionState::Disconnected;
            return Err(e);
        }

        self.transport = Some(transport);
        Ok(())
    }

    /// Send a command over the live channel.
    ///
    /// Only valid while `Connected`; otherwise fails with `NotConnected`
    /// without performing any I/O.
    pub async fn send(&mut self, command: &OutboundCommand) -> Result<(), BridgeError> {
        if self.state != ConnectionState::Connected {
            return Err(BridgeError::NotConnected);
        }
        let transport = self.transport.as_mut().ok_or(BridgeError::NotConnected)?;
        transport.send(command).await
    }

    /// Receive the next inbound message. `Ok(None)` means the channel closed.
    pub async fn recv(&mut self) -> Result<Option<NativeMessage>, BridgeError> {
        match self.transport.as_mut() {
            Some(transport) => transport.recv().await,
            None => Err(BridgeError::NotConnected),
        }
    }

    /// Observe an inbound message for connection-level effects.
    ///
    /// `handshake_ack` completes the handshake and zeroes the retry counter.
    /// Every other message leaves connection state untouched; the caller
    /// routes it onward regardless of state, since any traffic proves the
    /// channel is alive.
    pub fn observe(&mut self, message: &NativeMessage) {
        if let NativeMessage::HandshakeAck = message {
            match self.state {
                ConnectionState::Connecting => {
                    self.state = ConnectionState::Connected;
                    self.reconnect_attempts = 0;
                    tracing::info!("Handshake acknowledged, bridge connected");
                }
                other => {
                    tracing::debug!(state = %other, "handshake_ack outside Connecting ignored");
                }
            }
        }
    }

    /// Record a channel close or transport error.
    ///
    /// Returns the backoff delay to wait before the next `connect()`, or
    /// `None` once the attempt cap is exhausted (state becomes terminal
    /// `Error` and no further automatic attempts happen).
    pub fn on_disconnect(&mut self) -> Option<Duration> {
        self.transport = None;
        self.state = ConnectionState::Disconnected;

        if self.reconnect_attempts < self.policy.max_attempts {
            self.reconnect_attempts += 1;
            let delay = self.policy.delay_for(self.reconnect_attempts);
            tracing::warn!(
                attempt = self.reconnect_attempts,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Channel lost, reconnect scheduled"
            );
            Some(delay)
        } else {
            self.state = ConnectionState::Error;
            tracing::error!(
                attempts = self.reconnect_attempts,
                "Reconnection cap exhausted, bridge is down until manually restarted"
            );
            None
        }
    }

    /// Manual retry affordance: re-arm a terminal connection.
    ///
    /// Zeroes the retry counter and returns to `Disconnected` so the next
    /// `connect()` starts a fresh backoff cycle.
    pub fn reset(&mut self) {
        tracing::info!(state = %self.state, "Connection manually reset");
        self.transport = None;
        self.state = ConnectionState::Disconnected;
        self.reconnect_attempts = 0;
    }
}

// =============================================================================
// Tests
// =============================================================================
