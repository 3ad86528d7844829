use super::gemini::GeminiGenerator;
use super::openai::OpenAiGenerator;
use super::traits::Generator;
use crate::config::{GenerationConfig, GeneratorKind};
use std::sync::Arc;

/// Build the configured generator. The API key stays inside the gateway process.
pub fn create_generator(config: &GenerationConfig) -> anyhow::Result<Arc<dyn Generator>> {
    config.validate()?;
    if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        tracing::warn!(kind = ?config.kind, "generation API key is not set; /api/chat will fail");
    }

    let generator: Arc<dyn Generator> = match config.kind {
        GeneratorKind::Gemini => Arc::new(GeminiGenerator::new(config)),
        GeneratorKind::OpenAi => Arc::new(OpenAiGenerator::new(config)),
    };
    Ok(generator)
}
