//! OpenAI-compatible chat completion backend
//!
//! This module implements the ChatBackend trait over the standard
//! `/chat/completions` HTTP API. Any OpenAI-compatible endpoint works;
//! the base URL is configurable so tests can point it at a mock server.

use crate::config::OpenAiConfig;
use crate::error::{CoachError, Result};
use crate::providers::{ChatBackend, ChatMessage, ChatOptions, Role};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for chat completion requests
///
/// An unbounded hang on a third-party call is never acceptable; long
/// analyses still comfortably fit in this window.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI API backend
///
/// # Examples
///
/// ```no_run
/// use stridecoach::config::OpenAiConfig;
/// use stridecoach::providers::{ChatBackend, ChatMessage, ChatOptions, OpenAiBackend};
///
/// # async fn example() -> stridecoach::error::Result<()> {
/// let mut config = OpenAiConfig::default();
/// config.api_key = Some("sk-test".to_string());
/// let backend = OpenAiBackend::new(&config)?;
/// let options = ChatOptions::from_config(&config);
/// let reply = backend
///     .complete(&[ChatMessage::user("How was my week?")], &options)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    api_base: String,
}

/// Request payload for /chat/completions
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    temperature: f32,
}

/// Message in the wire format (role + content only; timestamps stay local)
#[derive(Debug, Serialize)]
struct WireMessage {
    role: Role,
    content: String,
}

/// Response payload from /chat/completions
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: WireReply,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    content: String,
}

impl OpenAiBackend {
    /// Create a new backend from configuration
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` if no API key is configured, or
    /// `CoachError::Upstream` if HTTP client initialization fails
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| CoachError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("stridecoach/0.2.0")
            .build()
            .map_err(|e| CoachError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized chat backend: base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
        })
    }

    fn convert_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = CompletionRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(messages),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        tracing::debug!(
            "Sending {} messages to chat backend (model={})",
            messages.len(),
            options.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoachError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat backend returned {}: {}", status, body);
            return Err(CoachError::Upstream(format!("HTTP {}: {}", status, body)).into());
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CoachError::Upstream(format!("Failed to parse response: {}", e)))?;

        let reply = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CoachError::Upstream("Response contained no choices".to_string()))?;

        Ok(reply)
    }
}
