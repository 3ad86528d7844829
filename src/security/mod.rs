pub mod pkce;
pub mod secrets;

pub use pkce::{PkcePair, random_token, state_matches};
pub use secrets::SecretStore;
