//! Voxlink core crate - shared error type, configuration, and the native
//! channel protocol.
//!
//! Everything here is consumed by more than one subsystem crate: the bridge
//! and the session both speak [`protocol`] messages, and every crate reports
//! failures through [`error::PanelError`].

pub mod config;
pub mod error;
pub mod protocol;

pub use config::PanelConfig;
pub use error::{PanelError, Result};
pub use protocol::{NativeMessage, OutboundCommand};
