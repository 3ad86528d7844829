use super::authorization::AuthorizationCallback;
use super::broker::Interaction;
use crate::error::IdentityError;
use async_trait::async_trait;
use axum::Router;
use axum::extract::{OriginalUri, State};
use axum::response::Html;
use axum::routing::get;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

const DONE_PAGE: &str =
    "<html><body><p>Sign-in complete. You can close this window and return to the terminal.</p></body></html>";

/// How long the terminal waits for the browser to come back.
pub const POPUP_TIMEOUT_SECS: u64 = 300;

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<String>>>>;

/// Terminal "popup": prints the authorization URL and catches the callback
/// on a one-shot HTTP listener bound to the configured redirect URI.
pub struct LoopbackInteraction {
    redirect_uri: Url,
    timeout: Duration,
}

impl LoopbackInteraction {
    pub fn new(redirect_uri: &str) -> Result<Self, IdentityError> {
        let redirect_uri = Url::parse(redirect_uri)
            .map_err(|e| IdentityError::PopupFailed(format!("invalid redirect uri: {e}")))?;
        match redirect_uri.host_str() {
            Some("127.0.0.1" | "localhost" | "[::1]") => Ok(Self {
                redirect_uri,
                timeout: Duration::from_secs(POPUP_TIMEOUT_SECS),
            }),
            _ => Err(IdentityError::PopupFailed(
                "redirect uri is not a loopback address".into(),
            )),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bind(&self) -> Result<TcpListener, IdentityError> {
        let host = self.redirect_uri.host_str().unwrap_or("127.0.0.1");
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = self.redirect_uri.port_or_known_default().unwrap_or(80);
        TcpListener::bind((host, port))
            .await
            .map_err(|e| IdentityError::PopupFailed(format!("cannot listen on {host}:{port}: {e}")))
    }
}

async fn capture_callback(
    State(sender): State<CallbackSender>,
    OriginalUri(uri): OriginalUri,
) -> Html<&'static str> {
    let query = uri.query().map(|q| format!("?{q}")).unwrap_or_default();
    if let Ok(mut slot) = sender.lock()
        && let Some(tx) = slot.take()
    {
        let _ = tx.send(query);
    }
    Html(DONE_PAGE)
}

#[async_trait]
impl Interaction for LoopbackInteraction {
    async fn popup(&self, authorize_url: &Url) -> Result<AuthorizationCallback, IdentityError> {
        let listener = self.bind().await?;

        let (callback_tx, callback_rx) = oneshot::channel::<String>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let sender: CallbackSender = Arc::new(Mutex::new(Some(callback_tx)));

        let app = Router::new()
            .route(self.redirect_uri.path(), get(capture_callback))
            .with_state(sender);

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        eprintln!(
            "{}",
            console::style("Open this URL in your browser to sign in:").bold()
        );
        eprintln!("  {}", console::style(authorize_url).cyan().underlined());
        tracing::debug!(redirect_uri = %self.redirect_uri, "waiting for sign-in callback");

        let received = tokio::time::timeout(self.timeout, callback_rx).await;
        let _ = shutdown_tx.send(());
        if let Err(error) = server.await {
            tracing::debug!(%error, "callback listener task ended abnormally");
        }

        let query = match received {
            Ok(Ok(query)) => query,
            Ok(Err(_)) => return Err(IdentityError::PopupFailed("sign-in window closed".into())),
            Err(_) => {
                tracing::info!(timeout_secs = self.timeout.as_secs(), "sign-in window timed out");
                return Err(IdentityError::PopupFailed("sign-in window timed out".into()));
            }
        };
        AuthorizationCallback::parse(&query)
            .map_err(|e| IdentityError::PopupFailed(e.to_string()))
    }
}
