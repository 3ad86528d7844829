pub mod schema;

pub use schema::{
    BackendConfig, Config, GatewayConfig, GenerationConfig, GeneratorKind, IdentityConfig,
    IdentityProviderKind, RelayConfig, SecretsConfig,
};
