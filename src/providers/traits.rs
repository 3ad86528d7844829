use crate::conversation::Message;
use async_trait::async_trait;

/// Text generation behind the relay endpoint.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Produce the next assistant reply for `history` under `system_prompt`.
    async fn generate(&self, system_prompt: &str, history: &[Message]) -> anyhow::Result<String>;

    /// Warm up the HTTP connection pool. Default is a no-op.
    async fn warmup(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
