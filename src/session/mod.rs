//! Coaching sessions: bounded conversation history and per-user lifecycle
//!
//! [`Conversation`] keeps the message history within its limits via
//! summarizing compaction, [`CoachSession`] drives individual turns against
//! a chat backend, and [`SessionRegistry`] tracks the live session per user.

pub mod conversation;
pub mod registry;
pub mod session;

pub use conversation::{Conversation, SUMMARY_TAG};
pub use registry::SessionRegistry;
pub use session::{ActivityContext, CoachSession, ConversationExport, SessionStats};
