use mentorbridge::config::Config;
use mentorbridge::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_TOKEN: &str = "session-user-1";
pub const OTHER_USER_TOKEN: &str = "session-user-2";
pub const GEMINI_REPLY: &str = "Pick one goal and do the first step today.";

/// A real gateway on an ephemeral port, with the backend auth API and the
/// Gemini API faked by wiremock and the conversation table in a temp dir.
pub struct GatewayTestServer {
    pub port: u16,
    pub backend: MockServer,
    pub generation: MockServer,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _workspace: TempDir,
}

pub struct GatewayOptions {
    pub require_auth: bool,
    pub generation_status: u16,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            require_auth: true,
            generation_status: 200,
        }
    }
}

async fn mount_backend_users(backend: &MockServer) {
    for (token, id, email) in [
        (USER_TOKEN, "user-1", "ada@example.com"),
        (OTHER_USER_TOKEN, "user-2", "grace@example.com"),
    ] {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": id, "email": email})),
            )
            .mount(backend)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"msg": "invalid JWT"})),
        )
        .with_priority(10)
        .mount(backend)
        .await;
}

async fn mount_generation(generation: &MockServer, status: u16) {
    let response = if status == 200 {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": GEMINI_REPLY}]},
                "finishReason": "STOP"
            }]
        }))
    } else {
        ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": {"code": status, "message": "Resource has been exhausted"}
        }))
    };

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(response)
        .mount(generation)
        .await;
}

impl GatewayTestServer {
    pub async fn start(options: GatewayOptions) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let backend = MockServer::start().await;
        let generation = MockServer::start().await;
        mount_backend_users(&backend).await;
        mount_generation(&generation, options.generation_status).await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config {
            config_path: workspace.path().join("config.toml"),
            ..Config::default()
        };
        config.gateway.require_auth = options.require_auth;
        config.gateway.database_path = Some(
            workspace
                .path()
                .join("conversations.db")
                .to_string_lossy()
                .into_owned(),
        );
        config.backend.url = backend.uri();
        config.backend.anon_key = "anon-test".into();
        config.generation.api_key = Some("AIza-test-key".into());
        config.generation.base_url = Some(generation.uri());

        let host = "127.0.0.1".to_string();
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            backend,
            generation,
            handle,
            _workspace: workspace,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub fn ws_url(&self, query: &str) -> String {
        format!("ws://127.0.0.1:{}/api/conversations/ws{query}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    panic!("gateway did not become ready on port {port}");
}
