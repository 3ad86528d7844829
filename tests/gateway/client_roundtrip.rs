use super::gateway_harness::{GEMINI_REPLY, GatewayOptions, GatewayTestServer, USER_TOKEN};
use mentorbridge::config::RelayConfig;
use mentorbridge::conversation::{
    ChatController, ConversationStore, Mode, RemoteConversationStore, Role, SendOutcome,
};
use mentorbridge::relay::{Relay, RelayClient};
use std::sync::Arc;

fn client_side(server: &GatewayTestServer) -> (Arc<dyn Relay>, Arc<dyn ConversationStore>) {
    let relay = RelayConfig {
        base_url: server.url(""),
    };
    let relay_client: Arc<dyn Relay> = Arc::new(RelayClient::new(relay.chat_url()));
    let store: Arc<dyn ConversationStore> = Arc::new(RemoteConversationStore::new(
        relay.conversations_url(),
        USER_TOKEN,
    ));
    (relay_client, store)
}

#[tokio::test]
async fn controller_turn_is_relayed_and_persisted_through_gateway() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let (relay, store) = client_side(&server);

    let mut controller = ChatController::open(
        "user-1",
        Mode::Coach,
        Arc::clone(&relay),
        Arc::clone(&store),
        Some(USER_TOKEN.to_string()),
    )
    .await;
    assert_eq!(controller.messages(), [Mode::Coach.welcome_message()]);

    assert_eq!(controller.send("   ").await, SendOutcome::Skipped);
    assert_eq!(controller.send("help me train").await, SendOutcome::Replied);
    assert_eq!(controller.messages().len(), 3);
    assert_eq!(controller.messages()[2].content, GEMINI_REPLY);

    // A fresh controller sees the stored history, not the welcome message.
    let reopened = ChatController::open(
        "user-1",
        Mode::Coach,
        relay,
        store,
        Some(USER_TOKEN.to_string()),
    )
    .await;
    assert_eq!(reopened.messages().len(), 3);
    assert_eq!(reopened.messages()[1].role, Role::User);
}

#[tokio::test]
async fn relay_error_body_becomes_the_assistant_message() {
    let server = GatewayTestServer::start(GatewayOptions {
        generation_status: 500,
        ..GatewayOptions::default()
    })
    .await;
    let (relay, store) = client_side(&server);

    let mut controller =
        ChatController::open("user-1", Mode::Mentor, relay, store, Some(USER_TOKEN.into())).await;
    assert_eq!(controller.send("hello").await, SendOutcome::Failed);

    let last = controller.messages().last().expect("assistant message");
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.contains("\"error\""));
    assert!(last.content.contains("500"));
}

#[tokio::test]
async fn switching_mode_resets_to_that_modes_history() {
    let server = GatewayTestServer::start(GatewayOptions::default()).await;
    let (relay, store) = client_side(&server);

    let mut controller =
        ChatController::open("user-1", Mode::Coach, relay, store, Some(USER_TOKEN.into())).await;
    controller.send("coach me").await;

    controller.switch_mode(Mode::Mentor).await;
    assert_eq!(controller.messages(), [Mode::Mentor.welcome_message()]);

    controller.switch_mode(Mode::Coach).await;
    assert_eq!(controller.messages().len(), 3);
}
