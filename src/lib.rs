#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod host;
pub mod identity;
pub mod providers;
pub mod relay;
pub mod security;
pub mod session;

pub use config::Config;
pub use error::{BridgeError, Result};
