//! Chat-model client for AI-assisted outfit generation.
//!
//! Speaks the OpenAI-compatible chat-completions wire format so any
//! conforming endpoint works; the endpoint, model and key all come from
//! configuration. The generator depends on the [`ChatModel`] trait, not on
//! this client, which keeps tests free of network calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "VIRTUAL_CLOSET_API_KEY";

/// Conventional fallback used by most OpenAI-compatible tooling.
const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API key; when absent the `VIRTUAL_CLOSET_API_KEY` /
    /// `OPENAI_API_KEY` environment variables are consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the chat-completions endpoint.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            timeout_seconds: 60,
        }
    }
}

#[derive(Error, Debug)]
pub enum AiError {
    #[error("no API key configured (set {API_KEY_ENV} or {OPENAI_KEY_ENV})")]
    MissingApiKey,

    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("chat reply was empty")]
    EmptyReply,
}

/// The seam the outfit generator talks through.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// One-shot completion: system preamble plus a user prompt.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

/// Client for any OpenAI-compatible chat endpoint.
pub struct OpenAiChatModel {
    client: Client,
    config: AiConfig,
    api_key: String,
}

impl OpenAiChatModel {
    pub fn from_config(config: AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .or_else(|| std::env::var(OPENAI_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or(AiError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AiError::EmptyReply)?;

        debug!(reply_len = content.len(), "chat completion received");
        Ok(content)
    }
}
