//! Sign-in state machine tying host detection, the identity broker and the
//! session exchange together, plus the screen each state maps to.

use crate::error::BridgeError;
use crate::host::{HostContext, HostPlatform, detect_host};
use crate::identity::{Acquisition, IdentityBroker, IdentityToken, PendingAuthorization};
use crate::session::{Session, SessionBackend};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Refresh this long before a token actually expires.
pub const REFRESH_SKEW_SECS: i64 = 300;

#[derive(Debug, Clone, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BridgeState {
    Idle,
    Detecting,
    AcquiringIdentity,
    ExchangingSession,
    /// The primary surface must navigate to `url`.
    Redirecting { url: String },
    Ready(Box<Session>),
    /// Sign-in failed; `error` is shown to the user as-is.
    Failed { error: String },
    SignedOut,
}

/// What the user sees. Every state maps to one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInView {
    Loading,
    SignInPrompt,
    Retry { error: String },
    Redirecting { url: String },
    Chat { user_id: String, email: Option<String> },
}

impl BridgeState {
    pub fn view(&self) -> SignInView {
        match self {
            Self::Detecting | Self::AcquiringIdentity | Self::ExchangingSession => {
                SignInView::Loading
            }
            Self::Idle | Self::SignedOut => SignInView::SignInPrompt,
            Self::Redirecting { url } => SignInView::Redirecting { url: url.clone() },
            Self::Ready(session) => SignInView::Chat {
                user_id: session.user_id().to_string(),
                email: session.email().map(String::from),
            },
            Self::Failed { error } => SignInView::Retry {
                error: error.clone(),
            },
        }
    }
}

pub struct SessionBridge {
    host: Arc<dyn HostPlatform>,
    broker: IdentityBroker,
    backend: Arc<dyn SessionBackend>,
    backend_provider: String,
    state: BridgeState,
    context: Option<HostContext>,
    pending: Option<PendingAuthorization>,
}

impl SessionBridge {
    pub fn new(
        host: Arc<dyn HostPlatform>,
        broker: IdentityBroker,
        backend: Arc<dyn SessionBackend>,
        backend_provider: impl Into<String>,
    ) -> Self {
        Self {
            host,
            broker,
            backend,
            backend_provider: backend_provider.into(),
            state: BridgeState::Idle,
            context: None,
            pending: None,
        }
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn view(&self) -> SignInView {
        self.state.view()
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            BridgeState::Ready(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    pub fn host_context(&self) -> Option<&HostContext> {
        self.context.as_ref()
    }

    fn transition(&mut self, next: BridgeState) {
        tracing::debug!(from = self.state.as_ref(), to = next.as_ref(), "sign-in state");
        self.state = next;
    }

    fn fail(&mut self, error: impl Into<BridgeError>) {
        let error = error.into();
        tracing::warn!(%error, "sign-in failed");
        self.transition(BridgeState::Failed {
            error: display_error(&error),
        });
    }

    /// Detect the host, acquire an identity, exchange it for a session.
    /// Failures land in [`BridgeState::Failed`]; nothing propagates.
    pub async fn sign_in(&mut self) -> &BridgeState {
        self.pending = None;
        self.transition(BridgeState::Detecting);
        let context = detect_host(self.host.as_ref()).await;
        self.context = Some(context);

        let assertion = match self.host_assertion().await {
            Ok(assertion) => assertion,
            Err(error) => {
                self.fail(error);
                return &self.state;
            }
        };

        self.transition(BridgeState::AcquiringIdentity);
        match self.broker.acquire(assertion.as_deref()).await {
            Ok(Acquisition::Token(identity)) => self.exchange(identity).await,
            Ok(Acquisition::Redirect(pending)) => {
                let url = pending.url.to_string();
                self.pending = Some(pending);
                self.transition(BridgeState::Redirecting { url });
            }
            Err(error) => self.fail(error),
        }
        &self.state
    }

    /// Complete a redirect sign-in with the URL the provider returned to.
    pub async fn resume_redirect(&mut self, callback_url: &str) -> &BridgeState {
        let Some(pending) = self.pending.take() else {
            self.fail(crate::error::IdentityError::Callback(
                "no redirect sign-in in progress".into(),
            ));
            return &self.state;
        };

        self.transition(BridgeState::AcquiringIdentity);
        match self.broker.complete_redirect(&pending, callback_url).await {
            Ok(identity) => self.exchange(identity).await,
            Err(error) => self.fail(error),
        }
        &self.state
    }

    /// Silent re-acquisition and re-exchange. Any failure ends the session.
    pub async fn refresh(&mut self) -> &BridgeState {
        if !matches!(self.state, BridgeState::Ready(_)) {
            return &self.state;
        }

        let refreshed = async {
            let assertion = self.host_assertion().await?;
            let identity = self.broker.acquire_silent(assertion.as_deref()).await?;
            let backend = self
                .backend
                .exchange(&identity, &self.backend_provider)
                .await?;
            Ok::<_, BridgeError>(Session { identity, backend })
        }
        .await;

        match refreshed {
            Ok(session) => {
                tracing::info!(user = session.user_id(), "session refreshed");
                self.transition(BridgeState::Ready(Box::new(session)));
            }
            Err(error) => {
                tracing::warn!(%error, "session refresh failed; signing out");
                self.broker.forget();
                self.transition(BridgeState::SignedOut);
            }
        }
        &self.state
    }

    /// Refresh when the current session is within [`REFRESH_SKEW_SECS`] of expiry.
    pub async fn ensure_fresh(&mut self) -> &BridgeState {
        let stale = self
            .session()
            .is_some_and(|s| s.needs_refresh(Utc::now(), Duration::seconds(REFRESH_SKEW_SECS)));
        if stale {
            self.refresh().await
        } else {
            &self.state
        }
    }

    pub async fn sign_out(&mut self) -> &BridgeState {
        if let BridgeState::Ready(session) = &self.state
            && let Err(error) = self.backend.sign_out(&session.backend).await
        {
            tracing::warn!(%error, "backend sign-out failed; dropping session locally");
        }
        self.broker.forget();
        self.pending = None;
        self.transition(BridgeState::SignedOut);
        &self.state
    }

    async fn host_assertion(&self) -> Result<Option<String>, BridgeError> {
        match &self.context {
            Some(HostContext::Embedded { .. }) => {
                Ok(Some(self.host.identity_assertion().await?))
            }
            _ => Ok(None),
        }
    }

    async fn exchange(&mut self, identity: IdentityToken) {
        self.transition(BridgeState::ExchangingSession);
        match self
            .backend
            .exchange(&identity, &self.backend_provider)
            .await
        {
            Ok(backend) => {
                let session = Session { identity, backend };
                tracing::info!(user = session.user_id(), "signed in");
                self.transition(BridgeState::Ready(Box::new(session)));
            }
            Err(error) => self.fail(error),
        }
    }
}

/// Backend rejections are shown verbatim; other failures keep their stage prefix.
fn display_error(error: &BridgeError) -> String {
    match error {
        BridgeError::Exchange(inner) => inner.to_string(),
        other => other.to_string(),
    }
}
