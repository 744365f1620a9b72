//! An out-of-the-box chat overlay that wires the conversation client
//! to a real backend.
//!
//! The crate includes a CLI tool that plays the role of the opened
//! overlay in the terminal. And you can also use it as a library to
//! bring the chatroom into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod contact;
pub mod markdown;
mod overlay;

pub use overlay::{Overlay, OverlayBuilder};

/// Re-exports of [`retrochat_core`] crate.
pub mod core {
    pub use retrochat_core::*;
}
