//! Identity broker: obtains an identity-provider token, trying silent
//! acquisition first, then a popup, then a full redirect.

pub mod authorization;
pub mod broker;
pub mod loopback;
pub mod provider;
pub mod tokens;

pub use authorization::{AuthorizationCallback, PendingAuthorization};
pub use broker::{Acquisition, IdentityBroker, Interaction};
pub use loopback::LoopbackInteraction;
pub use provider::{IdentityProvider, OAuthIdentityProvider};
pub use tokens::{AcquisitionSource, IdentityToken};
