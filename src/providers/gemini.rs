use super::gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationParams, Part,
};
use super::http_client::build_client;
use super::scrub::{api_error, sanitize_api_error};
use super::traits::Generator;
use crate::config::GenerationConfig;
use crate::conversation::{Message, Role};
use async_trait::async_trait;
use reqwest::Client;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiGenerator {
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f64,
    max_output_tokens: u32,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
            model: config.model.clone(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            client: build_client(),
        }
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini API key not configured. Set GEMINI_API_KEY or generation.api_key in config.toml"
            )
        })
    }

    /// Gemini wants alternating turns that open with the user, so leading
    /// assistant messages (the welcome text) are dropped and repeated roles merged.
    fn build_request(&self, system_prompt: &str, history: &[Message]) -> GenerateContentRequest {
        let mut contents: Vec<Content> = Vec::with_capacity(history.len());

        for message in history
            .iter()
            .skip_while(|m| m.role != Role::User)
            .filter(|m| !m.content.trim().is_empty())
        {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            match contents.last_mut() {
                Some(last) if last.role == Some(role) => last.parts.push(Part {
                    text: message.content.clone(),
                }),
                _ => contents.push(Content {
                    role: Some(role),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                }),
            }
        }

        let system_instruction = (!system_prompt.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: system_prompt.to_string(),
            }],
        });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationParams {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        if let Some(err) = result.error.as_ref() {
            anyhow::bail!("Gemini API error: {}", sanitize_api_error(&err.message));
        }

        if let Some(reason) = result
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            anyhow::bail!("Gemini blocked the prompt ({reason})");
        }

        let Some(candidate) = result.candidates.first() else {
            anyhow::bail!("No response from Gemini");
        };

        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            anyhow::bail!("No response from Gemini (finish reason: {reason})");
        }

        Ok(text)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, system_prompt: &str, history: &[Message]) -> anyhow::Result<String> {
        let api_key = self.api_key()?;
        let request = self.build_request(system_prompt, history);
        if request.contents.is_empty() {
            anyhow::bail!("conversation has no user message to answer");
        }

        let url = format!(
            "{}/{}:generateContent",
            self.base_url,
            Self::model_name(&self.model)
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Gemini request failed: {}", e.without_url()))?;

        if !response.status().is_success() {
            return Err(api_error("Gemini", response).await);
        }

        let result: GenerateContentResponse = response.json().await?;
        Self::extract_text(&result)
    }

    async fn warmup(&self) -> anyhow::Result<()> {
        if self.api_key.is_none() {
            return Ok(());
        }
        // Any response proves the TLS session is up.
        let _ = self.client.head(&self.base_url).send().await;
        Ok(())
    }
}
