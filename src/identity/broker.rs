use super::authorization::{AuthorizationCallback, PendingAuthorization};
use super::provider::IdentityProvider;
use super::tokens::{AcquisitionSource, IdentityToken};
use crate::error::IdentityError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Shows an authorization URL to the user in a secondary surface and waits
/// for the provider's callback.
#[async_trait]
pub trait Interaction: Send + Sync {
    async fn popup(&self, authorize_url: &Url) -> Result<AuthorizationCallback, IdentityError>;
}

/// Result of [`IdentityBroker::acquire`].
#[derive(Debug)]
pub enum Acquisition {
    Token(IdentityToken),
    /// Navigate the primary surface to `pending.url`; the flow resumes with
    /// [`IdentityBroker::complete_redirect`].
    Redirect(PendingAuthorization),
}

/// Silent → popup → redirect chain. Each step is tried once, and only when
/// the step before it failed.
pub struct IdentityBroker {
    provider: Arc<dyn IdentityProvider>,
    interaction: Arc<dyn Interaction>,
}

impl IdentityBroker {
    pub fn new(provider: Arc<dyn IdentityProvider>, interaction: Arc<dyn Interaction>) -> Self {
        Self {
            provider,
            interaction,
        }
    }

    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    pub async fn acquire(
        &self,
        host_assertion: Option<&str>,
    ) -> Result<Acquisition, IdentityError> {
        match self.provider.acquire_silent(host_assertion).await {
            Ok(token) => return Ok(Acquisition::Token(token)),
            Err(error) if error.is_interaction_required() => {
                tracing::info!(%error, provider = self.provider.name(), "silent sign-in needs the user; opening popup");
            }
            Err(error) => return Err(error),
        }

        match self.popup().await {
            Ok(token) => return Ok(Acquisition::Token(token)),
            Err(error) => {
                tracing::warn!(%error, provider = self.provider.name(), "popup sign-in failed; falling back to redirect");
            }
        }

        let pending = self.provider.begin_authorization()?;
        Ok(Acquisition::Redirect(pending))
    }

    /// Token acquisition that never involves the user.
    pub async fn acquire_silent(
        &self,
        host_assertion: Option<&str>,
    ) -> Result<IdentityToken, IdentityError> {
        self.provider.acquire_silent(host_assertion).await
    }

    /// Finish a redirect sign-in from the URL the provider returned to.
    pub async fn complete_redirect(
        &self,
        pending: &PendingAuthorization,
        callback_url: &str,
    ) -> Result<IdentityToken, IdentityError> {
        let callback = AuthorizationCallback::parse(callback_url)?;
        self.provider
            .complete_authorization(pending, &callback, AcquisitionSource::Redirect)
            .await
    }

    pub fn forget(&self) {
        self.provider.forget();
    }

    async fn popup(&self) -> Result<IdentityToken, IdentityError> {
        let pending = self.provider.begin_authorization()?;
        let callback = self.interaction.popup(&pending.url).await?;
        self.provider
            .complete_authorization(&pending, &callback, AcquisitionSource::Popup)
            .await
    }
}
