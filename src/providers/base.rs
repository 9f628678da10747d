//! Chat backend trait and common message types
//!
//! This module defines the ChatBackend trait that chat completion
//! implementations must satisfy, along with the message and request
//! option structures shared across the crate.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a conversation message sender
///
/// A closed enumeration: the wire protocol only ever sees these three
/// values, serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions establishing the assistant's behavior
    System,
    /// Messages from the human (or injected context on their behalf)
    User,
    /// Replies from the model, including synthetic summary messages
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a coaching conversation
///
/// Messages are created once and never mutated; the conversation log is
/// append-only except for wholesale replacement during compaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender role
    pub role: Role,
    /// Text payload
    pub content: String,
    /// Creation time (UTC)
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new message with the current timestamp
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use stridecoach::providers::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::system("You are a running coach");
    /// assert_eq!(msg.role, Role::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Estimates the context cost of this message
    ///
    /// Uses the chars/4 heuristic, which approximates GPT tokenization
    /// for English text. Thresholds built on this estimate are
    /// configuration, so a real tokenizer could be substituted without
    /// changing any contract.
    ///
    /// # Examples
    ///
    /// ```
    /// use stridecoach::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::user("hello world");
    /// assert_eq!(msg.estimated_tokens(), 3);
    /// ```
    pub fn estimated_tokens(&self) -> usize {
        (self.content.chars().count() + 3) / 4
    }
}

/// Per-request options for a chat completion call
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Model identifier
    pub model: String,
    /// Maximum tokens in the reply
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
}

impl ChatOptions {
    /// Builds options from the chat backend configuration
    pub fn from_config(config: &crate::config::OpenAiConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_reply_tokens,
            temperature: config.temperature,
        }
    }
}

/// Trait for chat completion backends
///
/// The session orchestrator and the context window manager both speak to
/// the model through this seam, which keeps the conversation logic
/// testable with a scripted implementation.
///
/// # Examples
///
/// ```no_run
/// use stridecoach::providers::{ChatBackend, ChatMessage, ChatOptions};
/// use stridecoach::error::Result;
/// use async_trait::async_trait;
///
/// struct MyBackend;
///
/// #[async_trait]
/// impl ChatBackend for MyBackend {
///     async fn complete(
///         &self,
///         messages: &[ChatMessage],
///         options: &ChatOptions,
///     ) -> Result<String> {
///         Ok("Reply".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Completes a conversation, returning the assistant's reply text
    ///
    /// The message list is sent in order, without reordering or
    /// deduplication.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Upstream` if the API call fails or the
    /// response is malformed
    async fn complete(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_role_rejects_unknown_value() {
        let result: std::result::Result<Role, _> = serde_json::from_str("\"tool\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, Role::System);
        assert_eq!(ChatMessage::user("b").role, Role::User);
        assert_eq!(ChatMessage::assistant("c").role, Role::Assistant);
    }

    #[test]
    fn test_estimated_tokens() {
        assert_eq!(ChatMessage::user("").estimated_tokens(), 0);
        assert_eq!(ChatMessage::user("test").estimated_tokens(), 1);
        assert_eq!(ChatMessage::user("hello world").estimated_tokens(), 3);
    }

    #[test]
    fn test_message_roundtrip_through_json() {
        let original = ChatMessage::assistant("Nice tempo run!");
        let json = serde_json::to_string(&original).expect("serialize");
        let restored: ChatMessage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.role, Role::Assistant);
        assert_eq!(restored.content, original.content);
        assert_eq!(restored.timestamp, original.timestamp);
    }

    #[test]
    fn test_chat_options_from_config() {
        let config = crate::config::OpenAiConfig::default();
        let options = ChatOptions::from_config(&config);
        assert_eq!(options.model, "gpt-3.5-turbo");
        assert_eq!(options.max_tokens, 1000);
    }
}
