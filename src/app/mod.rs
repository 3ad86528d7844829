pub mod chat;
pub mod credentials;
pub mod dispatch;
pub mod signin;
pub mod status;
mod style;

pub use dispatch::dispatch;
