//! Conversation relay: browser/client → relay endpoint → generation API.
//!
//! The wire types are shared by the client ([`RelayClient`]) and the
//! gateway handler that serves them, so both sides agree on
//! `{history, systemPrompt}` → `{response}` | `{error}`.

pub mod client;
pub mod wire;

pub use client::{Relay, RelayClient};
pub use wire::{RelayFailure, RelayReply, RelayRequest};
