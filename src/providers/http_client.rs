use reqwest::Client;
use std::time::Duration;

/// Shared outbound client for generation, identity and backend calls.
pub fn build_client() -> Client {
    build_client_with_timeout(120)
}

pub fn build_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "http client builder failed; using defaults");
            Client::new()
        })
}
