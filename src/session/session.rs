//! A single coaching session: one user, one activity context, one
//! conversation
//!
//! [`CoachSession`] owns the conversation for a user and drives each turn:
//! append the question, compact the history when it has outgrown its limits,
//! send the full in-order message list to the chat backend, and record the
//! reply. Backend failures on a turn are absorbed into the conversation as a
//! visible assistant message rather than tearing the session down; the
//! session is still usable for the next question.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::prompts;
use crate::providers::{ChatBackend, ChatMessage, ChatOptions, Role};
use crate::session::conversation::Conversation;

/// The workout data a session was opened with, resolved once at creation.
///
/// Keeping the shape explicit (one activity or a recent batch) lets the
/// initial-context prompt present the data appropriately instead of guessing
/// from a bare JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ActivityContext {
    /// A single activity under discussion.
    Single(serde_json::Value),
    /// A batch of recent activities.
    Batch(Vec<serde_json::Value>),
}

impl ActivityContext {
    /// Number of activities carried by this context.
    pub fn count(&self) -> usize {
        match self {
            ActivityContext::Single(_) => 1,
            ActivityContext::Batch(activities) => activities.len(),
        }
    }
}

/// Snapshot of conversation size and shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub user_id: String,
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub estimated_tokens: usize,
    pub session_duration_minutes: f64,
    pub activities_count: usize,
}

/// Full conversation dump for saving or offline analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationExport {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub activities: ActivityContext,
    pub initial_feedback: String,
    pub messages: Vec<ChatMessage>,
    pub stats: SessionStats,
}

/// One user's live coaching session.
pub struct CoachSession {
    user_id: String,
    created_at: DateTime<Utc>,
    context: ActivityContext,
    initial_feedback: String,
    conversation: Conversation,
    backend: Arc<dyn ChatBackend>,
    options: ChatOptions,
}

impl CoachSession {
    /// Opens a session seeded with the persona and the workout context.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        options: ChatOptions,
        limits: SessionConfig,
        user_id: impl Into<String>,
        context: ActivityContext,
        initial_feedback: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        let initial_feedback = initial_feedback.into();
        let conversation = Conversation::new(
            prompts::system_prompt(),
            prompts::initial_context(&user_id, &context, &initial_feedback),
            limits,
        );
        Self {
            user_id,
            created_at: Utc::now(),
            context,
            initial_feedback,
            conversation,
            backend,
            options,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Runs the canned opening analysis as the first turn.
    pub async fn start_analysis(&mut self) -> Result<String> {
        self.ask(&prompts::initial_analysis_prompt()).await
    }

    /// Asks the coach a question and returns the reply text.
    ///
    /// The question is appended first, then the history is compacted if it
    /// has outgrown its limits, then the full message list goes to the
    /// backend. A backend failure does not end the session: the error text
    /// is recorded as the assistant's reply and returned like any other
    /// answer.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        self.conversation.append(ChatMessage::user(question));

        if self.conversation.should_compact() {
            debug!(
                user = %self.user_id,
                messages = self.conversation.len(),
                "conversation over limits, compacting"
            );
            self.conversation
                .compact(self.backend.as_ref(), &self.options)
                .await;
        }

        let reply = match self
            .backend
            .complete(self.conversation.messages(), &self.options)
            .await
        {
            Ok(reply) => reply,
            Err(e) => format!("Error getting AI response: {}", e),
        };

        self.conversation.append(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Current conversation statistics.
    pub fn stats(&self) -> SessionStats {
        let messages = self.conversation.messages();
        SessionStats {
            user_id: self.user_id.clone(),
            total_messages: messages.len(),
            user_messages: messages.iter().filter(|m| m.role == Role::User).count(),
            assistant_messages: messages
                .iter()
                .filter(|m| m.role == Role::Assistant)
                .count(),
            estimated_tokens: self.conversation.estimated_tokens(),
            session_duration_minutes: (Utc::now() - self.created_at).num_seconds() as f64 / 60.0,
            activities_count: self.context.count(),
        }
    }

    /// Dumps the full conversation with metadata and stats.
    pub fn export(&self) -> ConversationExport {
        ConversationExport {
            user_id: self.user_id.clone(),
            created_at: self.created_at,
            activities: self.context.clone(),
            initial_feedback: self.initial_feedback.clone(),
            messages: self.conversation.messages().to_vec(),
            stats: self.stats(),
        }
    }
}
