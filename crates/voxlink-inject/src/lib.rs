//! Voxlink inject crate - placing recognized text into a target surface.
//!
//! The resolver takes a block of text and a delivery intent (the locally
//! focused field, or a named external chat surface) and works through an
//! ordered set of strategies. It is total: every delivery ends in either
//! "delivered" or "clipboard fallback used", never an unhandled failure,
//! and the transcribed text is never lost.
//!
//! The host platform's capabilities (focused-element lookup, tab
//! management, page scripting) sit behind the [`page::PageHost`] and
//! [`tabs::TabHost`] traits so the resolver's selection logic is
//! independent of how insertion is actually performed.

pub mod clipboard;
pub mod error;
pub mod page;
pub mod providers;
pub mod resolver;
pub mod surface;
pub mod tabs;

pub use clipboard::{Clipboard, SystemClipboard};
pub use error::InjectError;
pub use page::{FocusedElement, PageHost};
pub use resolver::{DeliveryTarget, InjectionAttempt, InjectionOutcome, InjectionResolver, Strategy};
pub use surface::{FieldBuffer, TextSurface};
pub use tabs::{ProbeOutcome, TabHost, TabId};
