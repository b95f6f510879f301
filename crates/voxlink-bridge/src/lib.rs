//! Voxlink bridge crate - lifecycle of the channel to the speech engine.
//!
//! Owns a single logical channel to the out-of-process recognition engine:
//! connect, handshake, send, receive-dispatch, disconnect, and reconnect
//! with bounded linear backoff. The wire format is one JSON object per
//! length-prefixed frame (see [`framing`]); the engine process itself is
//! reached through the [`transport::Connector`] seam so tests can drive the
//! connection without spawning anything.

pub mod connection;
pub mod error;
pub mod framing;
pub mod service;
pub mod transport;

pub use connection::{Connection, ConnectionState, ReconnectPolicy};
pub use error::BridgeError;
pub use service::{run, BridgeEvent};
pub use transport::{Connector, EngineProcessConnector, Transport};
