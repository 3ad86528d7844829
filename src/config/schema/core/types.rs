use super::super::{BackendConfig, GatewayConfig, GenerationConfig, IdentityConfig, RelayConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Encrypt API keys and client secrets in config.toml
    #[serde(default = "default_true")]
    pub encrypt: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self { encrypt: true }
    }
}

impl Config {
    /// Directory holding `config.toml`, the secret key and the conversation database.
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn database_path(&self) -> PathBuf {
        self.gateway
            .database_path
            .as_deref()
            .map_or_else(|| self.config_dir().join("conversations.db"), PathBuf::from)
    }

    pub fn validate(&self) -> Result<()> {
        self.generation.validate()
    }
}
