//! Bounded conversation history with summarizing compaction
//!
//! A [`Conversation`] holds the full message list for one coaching session.
//! The first two messages are load-bearing and never evicted: index 0 is the
//! coach persona (system role) and index 1 is the initial workout context
//! (user role). Everything after them is the running dialogue.
//!
//! When the dialogue grows past the configured ceilings, [`Conversation::compact`]
//! folds the middle of the history into a single model-written summary,
//! keeping the head pair and a recent tail verbatim. If the summarizer call
//! fails, a lossy fallback keeps the head pair plus the most recent messages
//! and drops the rest; the failure is logged but never surfaced to the user.

use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::prompts;
use crate::providers::{ChatBackend, ChatMessage, ChatOptions};

/// Prefix marking the synthetic message produced by compaction.
pub const SUMMARY_TAG: &str = "[CONVERSATION SUMMARY]: ";

/// Ordered message history for one session.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    limits: SessionConfig,
}

impl Conversation {
    /// Seeds a conversation with the persona and initial-context messages.
    pub fn new(system_prompt: String, initial_context: String, limits: SessionConfig) -> Self {
        Self {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(initial_context),
            ],
            limits,
        }
    }

    /// Appends a message to the end of the history.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The full in-order message list.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sum of the per-message token estimates.
    pub fn estimated_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.estimated_tokens()).sum()
    }

    /// Whether the history has outgrown its limits.
    ///
    /// The message-count ceiling is checked before the token budget, so a
    /// short-but-many conversation compacts on count alone without paying
    /// for the size estimate.
    pub fn should_compact(&self) -> bool {
        self.messages.len() > self.limits.max_messages_before_compaction
            || self.estimated_tokens() > self.limits.max_context_tokens
    }

    /// Folds the middle of the history into one summary message.
    ///
    /// Keeps the head pair (persona + initial context) and the last
    /// `preserved_tail` messages verbatim; everything between is rendered as
    /// a role-prefixed transcript and handed to `summarizer` for a short
    /// summary, which re-enters the history as a single assistant message
    /// tagged with [`SUMMARY_TAG`].
    ///
    /// A no-op when there is nothing between head and tail. Summarizer
    /// failure falls back to keeping the head pair plus the last
    /// `fallback_tail` messages; the dropped middle is lost. Either way this
    /// never returns an error.
    pub async fn compact(&mut self, summarizer: &dyn ChatBackend, options: &ChatOptions) {
        let tail_start = self.messages.len().saturating_sub(self.limits.preserved_tail);
        if tail_start <= 2 {
            return;
        }

        let middle = &self.messages[2..tail_start];
        let transcript = middle
            .iter()
            .map(|m| format!("{}: {}", m.role.to_string().to_uppercase(), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        match self.summarize(summarizer, options, &transcript).await {
            Ok(summary) => {
                info!(
                    summarized = middle.len(),
                    "compacted conversation middle into one summary"
                );
                let summary_message =
                    ChatMessage::assistant(format!("{}{}", SUMMARY_TAG, summary));
                let mut rebuilt = self.messages[..2].to_vec();
                rebuilt.push(summary_message);
                rebuilt.extend_from_slice(&self.messages[tail_start..]);
                self.messages = rebuilt;
            }
            Err(e) => {
                warn!(error = %e, "summarization failed, dropping conversation middle");
                let keep_from = self
                    .messages
                    .len()
                    .saturating_sub(self.limits.fallback_tail)
                    .max(2);
                let mut rebuilt = self.messages[..2].to_vec();
                rebuilt.extend_from_slice(&self.messages[keep_from..]);
                self.messages = rebuilt;
            }
        }
    }

    async fn summarize(
        &self,
        summarizer: &dyn ChatBackend,
        options: &ChatOptions,
        transcript: &str,
    ) -> Result<String> {
        let request = vec![
            ChatMessage::system(prompts::summarizer_system_prompt()),
            ChatMessage::user(prompts::summary_request(transcript)),
        ];
        summarizer.complete(&request, options).await
    }
}
