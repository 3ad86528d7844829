use serde::{Deserialize, Serialize};

/// Backend-as-a-service endpoint used for the session exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Public (anon) API key sent as the `apikey` header
    #[serde(default)]
    pub anon_key: String,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:54321".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            anon_key: String::new(),
        }
    }
}

/// Where clients reach the relay gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_base_url")]
    pub base_url: String,
}

fn default_relay_base_url() -> String {
    "http://127.0.0.1:3000".into()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: default_relay_base_url(),
        }
    }
}

impl RelayConfig {
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    pub fn conversations_url(&self) -> String {
        format!("{}/api/conversations", self.base_url.trim_end_matches('/'))
    }
}
