use super::gateway_harness::{GatewayOptions, GatewayTestServer, OTHER_USER_TOKEN, USER_TOKEN};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("realtime message should arrive in time")
            .expect("socket should stay open")
            .expect("frame should be readable");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("server frames should be json");
        }
    }
}

async fn save(server: &GatewayTestServer, token: &str, mode: &str, count: usize) {
    let messages: Vec<Value> = (0..count)
        .map(|i| serde_json::json!({"role": "user", "content": format!("m{i}")}))
        .collect();
    let response = reqwest::Client::new()
        .put(server.url(&format!("/api/conversations/{mode}")))
        .bearer_auth(token)
        .json(&serde_json::json!({ "messages": messages }))
        .send()
        .await
        .expect("put should complete");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn subscriber_sees_only_its_own_changes() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let (mut socket, _) =
        tokio_tungstenite::connect_async(server.ws_url(&format!("?access_token={USER_TOKEN}")))
            .await
            .expect("websocket handshake should succeed");

    let hello = next_json(&mut socket).await;
    assert_eq!(hello["type"], "connected");

    save(&server, OTHER_USER_TOKEN, "coach", 1).await;
    save(&server, USER_TOKEN, "mentor", 3).await;

    let change = next_json(&mut socket).await;
    assert_eq!(change["type"], "conversation_changed");
    assert_eq!(change["mode"], "mentor");
    assert_eq!(change["message_count"], 3);
    assert!(change.get("user_id").is_none());
}

#[tokio::test]
async fn ping_gets_pong() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let (mut socket, _) =
        tokio_tungstenite::connect_async(server.ws_url(&format!("?access_token={USER_TOKEN}")))
            .await
            .expect("websocket handshake should succeed");
    let _connected = next_json(&mut socket).await;

    socket
        .send(Message::text(r#"{"type":"ping"}"#))
        .await
        .expect("ping should send");
    assert_eq!(next_json(&mut socket).await["type"], "pong");

    socket
        .send(Message::text("not json"))
        .await
        .expect("garbage should send");
    assert_eq!(next_json(&mut socket).await["type"], "error");
}

#[tokio::test]
async fn handshake_without_valid_token_is_refused() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;

    assert!(
        tokio_tungstenite::connect_async(server.ws_url(""))
            .await
            .is_err()
    );
    assert!(
        tokio_tungstenite::connect_async(server.ws_url("?access_token=forged"))
            .await
            .is_err()
    );
}
