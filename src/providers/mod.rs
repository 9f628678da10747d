//! Chat backend abstraction and implementations
//!
//! The [`ChatBackend`] trait is the seam between the coaching logic and the
//! model serving it. [`OpenAiBackend`] talks to any OpenAI-compatible
//! chat-completions endpoint; [`ScriptedBackend`] replays canned replies for
//! tests.

pub mod base;
pub mod fake;
pub mod openai;

pub use base::{ChatBackend, ChatMessage, ChatOptions, Role};
pub use fake::ScriptedBackend;
pub use openai::OpenAiBackend;
