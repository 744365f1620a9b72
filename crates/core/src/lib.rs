//! Core logic of the streaming conversation client: transcript state,
//! turn submission, response-stream consumption and supersession.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod client;
mod exchange;
pub mod transcript;

pub use client::{ChatClient, ChatClientBuilder, ClientSnapshot};
