use super::fixtures::{BlockedPopup, bridge, mount_session_exchange, mount_token_grant};
use mentorbridge::bridge::{BridgeState, SignInView};
use mentorbridge::host::HostContext;
use mentorbridge::identity::AcquisitionSource;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn host_assertion_signs_in_without_interaction() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;
    mount_token_grant(&identity, "requested_token_use=on_behalf_of", "obo-access").await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "id_token"))
        .and(header("apikey", "anon-test"))
        .and(body_partial_json(serde_json::json!({
            "provider": "azure",
            "id_token": "id-obo-access",
            "access_token": "obo-access"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(super::fixtures::session_body("user-7")),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let mut bridge = bridge(&identity, &backend, Some("host-jwt"), Arc::new(BlockedPopup));
    bridge.sign_in().await;

    assert_eq!(
        bridge.host_context(),
        Some(&HostContext::Embedded {
            host: "teams".into()
        })
    );
    let session = bridge.session().expect("bridge should be signed in");
    assert_eq!(session.identity.source, AcquisitionSource::HostExchange);
    assert_eq!(session.user_id(), "user-7");
    assert_eq!(session.bearer(), "session-user-7");
    assert_eq!(
        bridge.view(),
        SignInView::Chat {
            user_id: "user-7".into(),
            email: Some("user-7@example.com".into())
        }
    );
}

#[tokio::test]
async fn rejected_exchange_is_shown_verbatim_and_terminal() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;
    mount_token_grant(&identity, "on_behalf_of", "obo-access").await;
    let rejection = r#"{"error":"provider_disabled","error_description":"Azure logins are disabled"}"#;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(rejection))
        .expect(1)
        .mount(&backend)
        .await;

    let mut bridge = bridge(&identity, &backend, Some("host-jwt"), Arc::new(BlockedPopup));
    bridge.sign_in().await;

    assert!(matches!(bridge.state(), BridgeState::Failed { .. }));
    assert_eq!(
        bridge.view(),
        SignInView::Retry {
            error: rejection.into()
        }
    );
    assert!(bridge.session().is_none());
}

#[tokio::test]
async fn refresh_failure_signs_out() {
    let identity = MockServer::start().await;
    let backend = MockServer::start().await;
    mount_session_exchange(&backend, "user-7").await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(super::fixtures::token_body("obo-access")),
        )
        .up_to_n_times(1)
        .mount(&identity)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "assertion expired"
        })))
        .mount(&identity)
        .await;

    let mut bridge = bridge(&identity, &backend, Some("host-jwt"), Arc::new(BlockedPopup));
    bridge.sign_in().await;
    assert!(bridge.session().is_some());

    bridge.refresh().await;
    assert!(matches!(bridge.state(), BridgeState::SignedOut));
    assert_eq!(bridge.view(), SignInView::SignInPrompt);
}
