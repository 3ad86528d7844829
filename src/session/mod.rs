//! Session exchanger: turns an identity-provider token into a backend
//! session.

pub mod exchange;
pub mod types;

pub use exchange::{SessionBackend, SessionExchanger};
pub use types::{BackendSession, BackendUser, Session};
