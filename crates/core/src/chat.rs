use crate::secrets::{SecretError, SecretStore};
use alexa_gpt_types::ChatMessage;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod config;
mod consts;

pub use config::{ChatConfig, ChatConfigBuilder};
pub use consts::MAX_SPOKEN_CHARS;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat API credential unavailable")]
    CredentialUnavailable(#[from] SecretError),
    #[error("chat completion failed: {0}")]
    UpstreamFailure(String),
}

// Handlers depend on this trait; tests substitute `MockChatCompletion`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends the full ordered message list and returns the model's reply.
    async fn ask(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: Option<String>,
}

pub struct OpenAiChatClient {
    client: Client,
    secrets: Arc<dyn SecretStore>,
    config: ChatConfig,
}

impl OpenAiChatClient {
    pub fn new(secrets: Arc<dyn SecretStore>, config: ChatConfig) -> Self {
        Self {
            client: Client::new(),
            secrets,
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    async fn ask(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError> {
        // Fetched per call, never cached.
        let api_key = self.secrets.get_value(self.config.secret_key()).await?;

        let body = CompletionRequest {
            model: self.config.model(),
            messages: &messages,
            max_tokens: self.config.max_tokens(),
        };

        tracing::debug!(
            "sending {} messages to {}",
            messages.len(),
            self.config.model()
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::UpstreamFailure(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChatError::UpstreamFailure(format!(
                "API returned {status}: {detail}"
            )));
        }

        let resp = response
            .json::<LlmResponse>()
            .await
            .map_err(|e| ChatError::UpstreamFailure(format!("invalid response body: {e}")))?;

        let reply = first_reply(resp)?;
        if reply.chars().count() > MAX_SPOKEN_CHARS {
            tracing::warn!(
                "reply is {} characters, over the requested {}",
                reply.chars().count(),
                MAX_SPOKEN_CHARS
            );
        }
        Ok(reply)
    }
}

/// Returns the first choice's content verbatim.
fn first_reply(resp: LlmResponse) -> Result<String, ChatError> {
    resp.choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::UpstreamFailure("No response from LLM".to_string()))?
        .message
        .content
        .ok_or_else(|| ChatError::UpstreamFailure("LLM choice has no content".to_string()))
}
