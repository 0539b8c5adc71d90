//! Host/panel messaging bridge for a sandboxed semver calculator surface.
//!
//! The privileged host composes nonce-gated markup ([`content`]) from a
//! loaded template ([`template`]), installs it into an isolated rendering
//! surface, and exchanges a closed, typed message vocabulary with it
//! ([`protocol`]) under a single-instance session state machine
//! ([`session`]). The panel's side of the conversation lives in [`panel`];
//! semantic-version arithmetic is delegated to [`version`].

pub mod content;
pub mod error;
pub mod panel;
pub mod protocol;
pub mod session;
pub mod template;
pub mod version;

pub use error::{Error, Result};
