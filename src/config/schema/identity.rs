use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Interchangeable identity providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdentityProviderKind {
    /// Microsoft Entra ID (tenant authority)
    #[default]
    Entra,
    Google,
    Auth0,
    /// Any OIDC provider with explicit endpoints
    Oidc,
}

impl IdentityProviderKind {
    /// Provider name the backend expects in the id-token exchange.
    pub fn backend_provider_name(self) -> &'static str {
        match self {
            Self::Entra => "azure",
            Self::Google => "google",
            Self::Auth0 => "auth0",
            Self::Oidc => "oidc",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub provider: IdentityProviderKind,
    #[serde(default)]
    pub client_id: String,
    /// Only needed for the on-behalf-of exchange of a host assertion
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Entra tenant id or `common`
    #[serde(default = "default_tenant")]
    pub tenant: String,
    /// Auth0 domain, e.g. `coach.eu.auth0.com`
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub authorize_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Override for the backend provider name
    #[serde(default)]
    pub backend_provider: Option<String>,
}

fn default_tenant() -> String {
    "common".into()
}

fn default_scopes() -> Vec<String> {
    ["openid", "profile", "email", "offline_access"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:53682/callback".into()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProviderKind::default(),
            client_id: String::new(),
            client_secret: None,
            tenant: default_tenant(),
            domain: None,
            authorize_url: None,
            token_url: None,
            scopes: default_scopes(),
            redirect_uri: default_redirect_uri(),
            backend_provider: None,
        }
    }
}

impl IdentityConfig {
    /// Resolve `(authorize_url, token_url)`. Explicit URLs always win.
    pub fn endpoints(&self) -> Result<(String, String)> {
        if let (Some(authorize), Some(token)) = (&self.authorize_url, &self.token_url) {
            return Ok((authorize.clone(), token.clone()));
        }

        match self.provider {
            IdentityProviderKind::Entra => {
                let tenant = self.tenant.trim();
                let base = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0");
                Ok((format!("{base}/authorize"), format!("{base}/token")))
            }
            IdentityProviderKind::Google => Ok((
                "https://accounts.google.com/o/oauth2/v2/auth".into(),
                "https://oauth2.googleapis.com/token".into(),
            )),
            IdentityProviderKind::Auth0 => {
                let Some(domain) = self.domain.as_deref().map(str::trim).filter(|d| !d.is_empty())
                else {
                    bail!("identity.domain is required for the auth0 provider");
                };
                let domain = domain.trim_end_matches('/');
                let base = if domain.starts_with("http") {
                    domain.to_string()
                } else {
                    format!("https://{domain}")
                };
                Ok((format!("{base}/authorize"), format!("{base}/oauth/token")))
            }
            IdentityProviderKind::Oidc => {
                bail!("identity.authorize_url and identity.token_url are required for the oidc provider")
            }
        }
    }

    pub fn backend_provider_name(&self) -> String {
        self.backend_provider
            .clone()
            .unwrap_or_else(|| self.provider.backend_provider_name().to_string())
    }

    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            bail!("identity.client_id is not configured");
        }
        self.endpoints()?;
        url::Url::parse(&self.redirect_uri)
            .map_err(|e| anyhow::anyhow!("identity.redirect_uri is not a valid URL: {e}"))?;
        Ok(())
    }
}
