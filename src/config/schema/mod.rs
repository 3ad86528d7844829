mod backend;
mod core;
mod gateway;
mod generation;
mod identity;

pub use backend::{BackendConfig, RelayConfig};
pub use self::core::{Config, SecretsConfig};
pub use gateway::GatewayConfig;
pub use generation::{GenerationConfig, GeneratorKind};
pub use identity::{IdentityConfig, IdentityProviderKind};
