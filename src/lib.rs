//! StrideCoach - AI running coach library
//!
//! This library provides the core functionality for the StrideCoach CLI:
//! Strava credential management, bounded coaching conversations, and the
//! chat backend abstraction.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: OAuth token storage, refresh, and authorization flow
//! - `session`: Conversation history, compaction, and per-user sessions
//! - `providers`: Chat backend abstraction and implementations
//! - `strava`: Strava REST API client for workout data
//! - `prompts`: Coach persona and prompt text
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use stridecoach::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     // Session setup would go here
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod strava;

// Re-export commonly used types
pub use auth::{AuthManager, FileTokenStore, TokenRecord};
pub use config::Config;
pub use error::{CoachError, Result};
pub use providers::{ChatBackend, ChatMessage, Role};
pub use session::{ActivityContext, CoachSession, SessionRegistry};
