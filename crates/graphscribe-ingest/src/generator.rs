//! Statement generation through an OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{IngestError, Result};
use crate::prompt::{build_messages, ChatMessage};

/// Produces a graph statement for a piece of text given the current schema.
#[async_trait]
pub trait StatementGenerator: Send + Sync {
    /// Return the raw generated statement, code fences included.
    async fn generate(&self, schema: &str, text: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionsResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Generator backed by `POST {base_url}/chat/completions`.
pub struct OpenAiGenerator {
    config: LlmConfig,
    client: Client,
}

impl OpenAiGenerator {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl StatementGenerator for OpenAiGenerator {
    async fn generate(&self, schema: &str, text: &str) -> Result<String> {
        let request = ChatCompletionsRequest {
            model: &self.config.model,
            messages: build_messages(schema, text),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IngestError::Generation(format!(
                "{} returned {status}: {body}",
                self.endpoint()
            )));
        }

        let completion: ChatCompletionsResponse = response.json().await?;
        let statement = extract_statement(completion)?;
        tracing::debug!(model = %self.config.model, chars = statement.len(), "Statement generated");
        Ok(statement)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Take the first choice's content, rejecting an empty completion.
pub fn extract_statement(response: ChatCompletionsResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::Generation("No choices in response".to_string()))?;

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(IngestError::Generation(format!(
            "Empty completion (finish reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}
