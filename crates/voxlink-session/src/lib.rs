//! Voxlink session crate - recording session state machine.
//!
//! Consumes user toggles and native engine messages, tracks the
//! Ready -> Recording -> Processing -> Ready lifecycle, and emits the final
//! transcript plus UI-facing effects. Session transitions never depend on
//! downstream side effects (history, injection); those are the panel's
//! problem and can fail without wedging the session.

pub mod codes;
pub mod engine;
pub mod error;
pub mod state;

pub use engine::{SessionEffect, SessionEngine};
pub use error::SessionError;
pub use state::SessionState;
