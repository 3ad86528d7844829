use super::gateway_harness::{GatewayOptions, GatewayTestServer, OTHER_USER_TOKEN, USER_TOKEN};
use reqwest::StatusCode;
use serde_json::Value;

fn messages(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            serde_json::json!({"role": role, "content": format!("message {i}")})
        })
        .collect();
    serde_json::json!({ "messages": items })
}

#[tokio::test]
async fn conversation_row_is_created_then_overwritten() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/conversations/mentor");

    let missing = client
        .get(&url)
        .bearer_auth(USER_TOKEN)
        .send()
        .await
        .expect("get should complete");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    for count in [2, 4] {
        let saved = client
            .put(&url)
            .bearer_auth(USER_TOKEN)
            .json(&messages(count))
            .send()
            .await
            .expect("put should complete");
        assert_eq!(saved.status(), StatusCode::OK);
        let saved: Value = saved.json().await.expect("put body should be json");
        assert_eq!(saved["user_id"], "user-1");
        assert_eq!(saved["mode"], "mentor");
    }

    let loaded: Value = client
        .get(&url)
        .bearer_auth(USER_TOKEN)
        .send()
        .await
        .expect("get should complete")
        .json()
        .await
        .expect("get body should be json");
    let stored = loaded["messages"].as_array().expect("messages array");
    assert_eq!(stored.len(), 4, "last writer wins, rows are not appended");
    assert_eq!(stored[3]["content"], "message 3");
}

#[tokio::test]
async fn modes_and_users_have_separate_rows() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let client = reqwest::Client::new();

    let saved = client
        .put(server.url("/api/conversations/coach"))
        .bearer_auth(USER_TOKEN)
        .json(&messages(2))
        .send()
        .await
        .expect("put should complete");
    assert_eq!(saved.status(), StatusCode::OK);

    let other_mode = client
        .get(server.url("/api/conversations/mentor"))
        .bearer_auth(USER_TOKEN)
        .send()
        .await
        .expect("get should complete");
    assert_eq!(other_mode.status(), StatusCode::NOT_FOUND);

    let other_user = client
        .get(server.url("/api/conversations/coach"))
        .bearer_auth(OTHER_USER_TOKEN)
        .send()
        .await
        .expect("get should complete");
    assert_eq!(other_user.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversations_reject_unknown_modes_and_missing_tokens() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let client = reqwest::Client::new();

    let unknown = client
        .get(server.url("/api/conversations/therapist"))
        .bearer_auth(USER_TOKEN)
        .send()
        .await
        .expect("get should complete");
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let anonymous = client
        .put(server.url("/api/conversations/coach"))
        .json(&messages(1))
        .send()
        .await
        .expect("put should complete");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}
