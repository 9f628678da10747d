//! Command-line interface definition for StrideCoach
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the coaching chat, credential management, and
//! activity listings.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// StrideCoach - AI running coach for your Strava data
///
/// Talk through your training with a coach that has your recent workouts
/// in front of it.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "stridecoach")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "STRIDECOACH_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for StrideCoach
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive coaching session
    Chat {
        /// User to run the session for
        #[arg(short, long)]
        user: String,

        /// How the recent training felt, passed to the coach as context
        #[arg(short, long, default_value = "")]
        feedback: String,

        /// Number of recent activities to load
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Manage Strava authorization
    Auth {
        /// Authorization subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// List recent activities
    Activities {
        /// User whose activities to list
        #[arg(short, long)]
        user: String,

        /// Number of activities to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Authorization subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Run the browser authorization flow for a user
    Login {
        /// User to authorize
        #[arg(short, long)]
        user: String,
    },

    /// List users with stored credentials
    List,

    /// Show stored credential status for a user
    Status {
        /// User to inspect
        #[arg(short, long)]
        user: String,
    },

    /// Revoke a user's access and delete stored credentials
    Revoke {
        /// User to revoke
        #[arg(short, long)]
        user: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Export destination used by the chat REPL's `/export` command.
pub fn default_export_path(user: &str) -> PathBuf {
    PathBuf::from(format!("stridecoach-conversation-{}.json", user))
}
