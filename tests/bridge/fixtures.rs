use async_trait::async_trait;
use mentorbridge::bridge::SessionBridge;
use mentorbridge::config::{IdentityConfig, IdentityProviderKind};
use mentorbridge::error::IdentityError;
use mentorbridge::host::EnvHostPlatform;
use mentorbridge::identity::{
    AuthorizationCallback, IdentityBroker, Interaction, OAuthIdentityProvider,
};
use mentorbridge::session::SessionExchanger;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REDIRECT_URI: &str = "http://127.0.0.1:53682/callback";

/// Popup blocked by the environment.
pub struct BlockedPopup;

#[async_trait]
impl Interaction for BlockedPopup {
    async fn popup(&self, _: &Url) -> Result<AuthorizationCallback, IdentityError> {
        Err(IdentityError::PopupFailed("popup blocked".into()))
    }
}

/// Popup that completes immediately with a fixed code, echoing the state.
pub struct InstantPopup;

#[async_trait]
impl Interaction for InstantPopup {
    async fn popup(&self, url: &Url) -> Result<AuthorizationCallback, IdentityError> {
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        AuthorizationCallback::parse(&format!("{REDIRECT_URI}?code=popup-code&state={state}"))
    }
}

pub fn token_body(access: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "id_token": format!("id-{access}"),
        "refresh_token": format!("rt-{access}"),
        "expires_in": 3600,
        "token_type": "Bearer"
    })
}

pub fn session_body(user: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": format!("session-{user}"),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "backend-rt",
        "user": {"id": user, "email": format!("{user}@example.com")}
    })
}

pub async fn mount_session_exchange(backend: &MockServer, user: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(user)))
        .mount(backend)
        .await;
}

pub async fn mount_token_grant(identity: &MockServer, grant_marker: &str, access: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains(grant_marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access)))
        .mount(identity)
        .await;
}

pub fn identity_config(identity: &MockServer) -> IdentityConfig {
    IdentityConfig {
        provider: IdentityProviderKind::Oidc,
        client_id: "mentor-client".into(),
        client_secret: Some("mentor-secret".into()),
        authorize_url: Some(format!("{}/authorize", identity.uri())),
        token_url: Some(format!("{}/oauth/token", identity.uri())),
        redirect_uri: REDIRECT_URI.into(),
        backend_provider: Some("azure".into()),
        ..IdentityConfig::default()
    }
}

pub fn bridge(
    identity: &MockServer,
    backend: &MockServer,
    host_token: Option<&str>,
    interaction: Arc<dyn Interaction>,
) -> SessionBridge {
    let config = identity_config(identity);
    let provider = Arc::new(
        OAuthIdentityProvider::from_config(&config).expect("oidc provider should build"),
    );
    SessionBridge::new(
        Arc::new(EnvHostPlatform::new("teams", host_token.map(String::from))),
        IdentityBroker::new(provider, interaction),
        Arc::new(SessionExchanger::new(&backend.uri(), "anon-test")),
        config.backend_provider_name(),
    )
}
