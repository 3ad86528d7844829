//! Host-context detection: embedded in a host container or standalone.

use crate::error::HostError;
use async_trait::async_trait;

const HOST_TOKEN_ENV: &str = "MENTORBRIDGE_HOST_TOKEN";
const HOST_NAME_ENV: &str = "MENTORBRIDGE_HOST_NAME";

/// An embedding container that can vouch for the signed-in user.
#[async_trait]
pub trait HostPlatform: Send + Sync {
    fn name(&self) -> &str;

    /// Fails with [`HostError::NotEmbedded`] when not running inside the host.
    async fn initialize(&self) -> Result<(), HostError>;

    /// Host-issued identity assertion for the on-behalf-of exchange.
    async fn identity_assertion(&self) -> Result<String, HostError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostContext {
    Embedded { host: String },
    Standalone,
}

impl HostContext {
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }
}

/// Embedded when the host initializes, standalone otherwise.
pub async fn detect_host(platform: &dyn HostPlatform) -> HostContext {
    match platform.initialize().await {
        Ok(()) => {
            tracing::info!(host = platform.name(), "running inside host container");
            HostContext::Embedded {
                host: platform.name().to_string(),
            }
        }
        Err(error) => {
            tracing::debug!(%error, "host initialization failed; standalone mode");
            HostContext::Standalone
        }
    }
}

/// Host platform fed by the embedding process through the environment.
///
/// A container that launches the terminal client passes its assertion in
/// `MENTORBRIDGE_HOST_TOKEN`; without it the client runs standalone.
#[derive(Debug, Clone)]
pub struct EnvHostPlatform {
    name: String,
    token: Option<String>,
}

impl EnvHostPlatform {
    pub fn new(name: impl Into<String>, token: Option<String>) -> Self {
        Self {
            name: name.into(),
            token: token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        let name = std::env::var(HOST_NAME_ENV).unwrap_or_else(|_| "host".into());
        Self::new(name, std::env::var(HOST_TOKEN_ENV).ok())
    }
}

#[async_trait]
impl HostPlatform for EnvHostPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), HostError> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(HostError::NotEmbedded)
        }
    }

    async fn identity_assertion(&self) -> Result<String, HostError> {
        self.token.clone().ok_or_else(|| HostError::Assertion {
            host: self.name.clone(),
            message: format!("{HOST_TOKEN_ENV} is not set"),
        })
    }
}
