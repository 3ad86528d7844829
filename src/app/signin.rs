use super::credentials;
use super::style;
use crate::bridge::{SessionBridge, SignInView};
use crate::config::Config;
use crate::error::IdentityError;
use crate::host::EnvHostPlatform;
use crate::identity::{
    AuthorizationCallback, IdentityBroker, Interaction, LoopbackInteraction, OAuthIdentityProvider,
};
use crate::session::SessionExchanger;
use anyhow::{Context, Result};
use async_trait::async_trait;
use dialoguer::{Confirm, Input};
use std::sync::Arc;
use url::Url;

/// Interaction used with `--redirect`: the popup is never attempted, so the
/// broker moves straight to the redirect flow.
struct PopupDisabled;

#[async_trait]
impl Interaction for PopupDisabled {
    async fn popup(&self, _: &Url) -> Result<AuthorizationCallback, IdentityError> {
        Err(IdentityError::PopupFailed("popup disabled by --redirect".into()))
    }
}

/// Sign-in machinery for one CLI run.
pub struct SignIn {
    pub bridge: SessionBridge,
    provider: Arc<OAuthIdentityProvider>,
}

impl SignIn {
    pub fn from_config(config: &Config, redirect: bool) -> Result<Self> {
        config
            .identity
            .validate()
            .context("invalid [identity] configuration")?;

        let provider = Arc::new(
            OAuthIdentityProvider::from_config(&config.identity)?
                .with_refresh_token(credentials::load_refresh_token(config)),
        );
        let interaction: Arc<dyn Interaction> = if redirect {
            Arc::new(PopupDisabled)
        } else {
            Arc::new(LoopbackInteraction::new(&config.identity.redirect_uri)?)
        };

        let broker = IdentityBroker::new(provider.clone(), interaction);
        let bridge = SessionBridge::new(
            Arc::new(EnvHostPlatform::from_env()),
            broker,
            Arc::new(SessionExchanger::from_config(&config.backend)),
            config.identity.backend_provider_name(),
        );
        Ok(Self { bridge, provider })
    }

    /// Write the provider's current refresh token (or its absence) to disk.
    pub fn persist(&self, config: &Config) -> Result<()> {
        credentials::save_refresh_token(config, self.provider.cached_refresh_token().as_deref())
    }

    /// Drive the bridge until it is signed in (`true`) or the user gives up.
    pub async fn run_interactive(&mut self) -> Result<bool> {
        self.bridge.sign_in().await;
        loop {
            match self.bridge.view() {
                SignInView::Chat { user_id, email } => {
                    println!(
                        "{} Signed in as {}",
                        style::success("✓"),
                        style::value(email.unwrap_or(user_id))
                    );
                    return Ok(true);
                }
                SignInView::Redirecting { url } => {
                    println!("Open this URL in a browser to sign in:");
                    println!("  {}", style::url(&url));
                    println!(
                        "  {}",
                        style::dim("After signing in, copy the full address you land on.")
                    );
                    let callback: String = Input::new()
                        .with_prompt("Callback URL")
                        .interact_text()?;
                    self.bridge.resume_redirect(callback.trim()).await;
                }
                SignInView::Retry { error } => {
                    println!("{} {error}", style::error("Sign-in failed:"));
                    if !Confirm::new()
                        .with_prompt("Try again?")
                        .default(true)
                        .interact()?
                    {
                        return Ok(false);
                    }
                    self.bridge.sign_in().await;
                }
                SignInView::SignInPrompt => {
                    if !Confirm::new()
                        .with_prompt("You are signed out. Sign in now?")
                        .default(true)
                        .interact()?
                    {
                        return Ok(false);
                    }
                    self.bridge.sign_in().await;
                }
                SignInView::Loading => {
                    anyhow::bail!("sign-in stopped in state '{}'", self.bridge.state().as_ref())
                }
            }
        }
    }
}
