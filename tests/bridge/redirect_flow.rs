use super::fixtures::{
    BlockedPopup, InstantPopup, REDIRECT_URI, bridge, mount_session_exchange, mount_token_grant,
};
use mentorbridge::bridge::{BridgeState, SignInView};
use mentorbridge::host::HostContext;
use mentorbridge::identity::AcquisitionSource;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_param(url: &str) -> String {
    Url::parse(url)
        .expect("authorization url should parse")
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("authorization url should carry state")
}

#[tokio::test]
async fn standalone_popup_sign_in_exchanges_code() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;
    mount_token_grant(&identity, "code=popup-code", "popup-access").await;
    mount_session_exchange(&backend, "user-3").await;

    let mut bridge = bridge(&identity, &backend, None, Arc::new(InstantPopup));
    bridge.sign_in().await;

    assert_eq!(bridge.host_context(), Some(&HostContext::Standalone));
    let session = bridge.session().expect("popup sign-in should succeed");
    assert_eq!(session.identity.source, AcquisitionSource::Popup);
    assert_eq!(session.user_id(), "user-3");
}

#[tokio::test]
async fn blocked_popup_falls_back_to_redirect_and_resumes() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;
    mount_token_grant(&identity, "code=redirect-code", "redirect-access").await;
    mount_session_exchange(&backend, "user-4").await;

    let mut bridge = bridge(&identity, &backend, None, Arc::new(BlockedPopup));
    bridge.sign_in().await;

    let SignInView::Redirecting { url } = bridge.view() else {
        panic!("expected redirect, got {:?}", bridge.state());
    };
    assert!(url.starts_with(&format!("{}/authorize", identity.uri())));
    assert!(url.contains("code_challenge_method=S256"));

    let state = state_param(&url);
    bridge
        .resume_redirect(&format!("{REDIRECT_URI}?code=redirect-code&state={state}"))
        .await;

    let session = bridge.session().expect("redirect sign-in should succeed");
    assert_eq!(session.identity.source, AcquisitionSource::Redirect);
    assert_eq!(session.user_id(), "user-4");

    let token_requests = identity
        .received_requests()
        .await
        .expect("wiremock should record requests");
    let form = String::from_utf8_lossy(&token_requests[0].body).into_owned();
    assert!(form.contains("grant_type=authorization_code"));
    assert!(form.contains("code_verifier="));
}

#[tokio::test]
async fn redirect_with_wrong_state_fails_with_retry_view() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;

    let mut bridge = bridge(&identity, &backend, None, Arc::new(BlockedPopup));
    bridge.sign_in().await;
    assert!(matches!(bridge.state(), BridgeState::Redirecting { .. }));

    bridge
        .resume_redirect(&format!("{REDIRECT_URI}?code=stolen&state=forged"))
        .await;

    let SignInView::Retry { error } = bridge.view() else {
        panic!("expected retry view, got {:?}", bridge.state());
    };
    assert!(error.contains("state"));
    assert!(
        identity
            .received_requests()
            .await
            .expect("wiremock should record requests")
            .is_empty()
    );
}

#[tokio::test]
async fn sign_out_revokes_backend_session() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;
    mount_token_grant(&identity, "code=popup-code", "popup-access").await;
    mount_session_exchange(&backend, "user-3").await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer session-user-3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend)
        .await;

    let mut bridge = bridge(&identity, &backend, None, Arc::new(InstantPopup));
    bridge.sign_in().await;
    assert!(bridge.session().is_some());

    bridge.sign_out().await;
    assert!(matches!(bridge.state(), BridgeState::SignedOut));
    assert_eq!(bridge.view(), SignInView::SignInPrompt);
}
