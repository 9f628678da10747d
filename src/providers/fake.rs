//! In-process scripted chat backend for unit and integration tests
//!
//! This module provides [`ScriptedBackend`], a [`ChatBackend`] that replays
//! queued replies (or fails every call) instead of making network requests,
//! so conversation and session logic can be tested deterministically.
//!
//! Replies are consumed in FIFO order; once the queue is empty the backend
//! falls back to a canned reply so long scripted runs do not need one entry
//! per turn. Every request's message list is recorded and can be inspected
//! from the test side.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CoachError, Result};
use crate::providers::{ChatBackend, ChatMessage, ChatOptions};

/// Scripted chat backend for use in tests.
///
/// # Examples
///
/// ```
/// use stridecoach::providers::{ChatBackend, ChatMessage, ChatOptions, ScriptedBackend};
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = ScriptedBackend::with_replies(vec!["Nice pace!".to_string()]);
/// let options = ChatOptions {
///     model: "test".to_string(),
///     max_tokens: 100,
///     temperature: 0.0,
/// };
/// let reply = backend
///     .complete(&[ChatMessage::user("How was my run?")], &options)
///     .await
///     .unwrap();
/// assert_eq!(reply, "Nice pace!");
/// assert_eq!(backend.calls(), 1);
/// # }
/// ```
pub struct ScriptedBackend {
    replies: Mutex<Vec<String>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    fail_always: bool,
}

impl ScriptedBackend {
    /// Backend that answers every call with `"ok"`
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Backend that replays `replies` in order, then falls back to `"ok"`
    pub fn with_replies(mut replies: Vec<String>) -> Self {
        // Stored reversed so pop() yields FIFO order
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
            fail_always: false,
        }
    }

    /// Backend whose every call fails with an upstream error
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            fail_always: true,
        }
    }

    /// Number of completion calls made so far
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    /// Message lists from every completion call, in call order
    pub fn recorded_requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, messages: &[ChatMessage], _options: &ChatOptions) -> Result<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(messages.to_vec());

        if self.fail_always {
            return Err(CoachError::Upstream("scripted failure".to_string()).into());
        }

        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop()
            .unwrap_or_else(|| "ok".to_string());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ChatOptions {
        ChatOptions {
            model: "test".to_string(),
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_replies_in_fifo_order() {
        let backend =
            ScriptedBackend::with_replies(vec!["first".to_string(), "second".to_string()]);
        let msgs = [ChatMessage::user("q")];
        assert_eq!(backend.complete(&msgs, &options()).await.unwrap(), "first");
        assert_eq!(backend.complete(&msgs, &options()).await.unwrap(), "second");
        // Queue exhausted: canned fallback
        assert_eq!(backend.complete(&msgs, &options()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_failing_backend_errors_every_call() {
        let backend = ScriptedBackend::failing();
        let msgs = [ChatMessage::user("q")];
        assert!(backend.complete(&msgs, &options()).await.is_err());
        assert!(backend.complete(&msgs, &options()).await.is_err());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_records_request_messages() {
        let backend = ScriptedBackend::new();
        let msgs = vec![ChatMessage::system("persona"), ChatMessage::user("q")];
        backend.complete(&msgs, &options()).await.unwrap();
        let recorded = backend.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].len(), 2);
        assert_eq!(recorded[0][1].content, "q");
    }
}
