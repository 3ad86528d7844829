use super::gateway_harness::{
    GEMINI_REPLY, GatewayOptions, GatewayTestServer, USER_TOKEN,
};
use reqwest::StatusCode;
use serde_json::Value;

fn chat_body() -> Value {
    serde_json::json!({
        "history": [
            {"role": "assistant", "content": "Hi, I'm your AI coach. What goal would you like to work on today?"},
            {"role": "user", "content": "I want to run a marathon"}
        ],
        "systemPrompt": "You are an encouraging AI coach."
    })
}

#[tokio::test]
async fn chat_relays_history_and_prompt_to_generation_api() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .bearer_auth(USER_TOKEN)
        .json(&chat_body())
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("chat response should be json");
    assert_eq!(body["response"], GEMINI_REPLY);

    let requests = server
        .generation
        .received_requests()
        .await
        .expect("wiremock should record requests");
    assert_eq!(requests.len(), 1);
    let sent: Value = requests[0].body_json().expect("gemini request should be json");
    // The welcome message is not sent; the prompt travels as a system instruction.
    assert_eq!(sent["contents"].as_array().map(Vec::len), Some(1));
    assert_eq!(sent["contents"][0]["parts"][0]["text"], "I want to run a marathon");
    assert_eq!(
        sent["systemInstruction"]["parts"][0]["text"],
        "You are an encouraging AI coach."
    );
    assert!(
        requests[0]
            .url
            .query()
            .is_some_and(|q| q.contains("key=AIza-test-key"))
    );
}

#[tokio::test]
async fn chat_requires_a_verified_session() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let client = reqwest::Client::new();

    let anonymous = client
        .post(server.url("/api/chat"))
        .json(&chat_body())
        .send()
        .await
        .expect("anonymous request should complete");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forged = client
        .post(server.url("/api/chat"))
        .bearer_auth("forged-token")
        .json(&chat_body())
        .send()
        .await
        .expect("forged request should complete");
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    let body: Value = forged.json().await.expect("401 body should be json");
    assert!(body["error"].is_string());

    let generated = server
        .generation
        .received_requests()
        .await
        .expect("wiremock should record requests");
    assert!(generated.is_empty(), "unauthenticated calls must not reach the generation API");
}

#[tokio::test]
async fn open_gateway_skips_session_check() {
    let server = GatewayTestServer::start(GatewayOptions {
        require_auth: false,
        ..GatewayOptions::default()
    })
    .await;

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .json(&chat_body())
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .bearer_auth(USER_TOKEN)
        .json(&serde_json::json!({"messages": []}))
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("400 body should be json");
    assert!(
        body.get("error")
            .and_then(Value::as_str)
            .is_some_and(|msg| msg.contains("Invalid JSON"))
    );
}

#[tokio::test]
async fn generation_failure_returns_error_without_api_key() {
    let server = GatewayTestServer::start(GatewayOptions {
        generation_status: 429,
        ..GatewayOptions::default()
    })
    .await;

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .bearer_auth(USER_TOKEN)
        .json(&chat_body())
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("500 body should be json");
    let error = body["error"].as_str().expect("error should be a string");
    assert!(error.contains("429"));
    assert!(!error.contains("AIza-test-key"));
    assert!(body.get("response").is_none());
}
