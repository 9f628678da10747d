/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`       — Interactive coaching session
- `auth`       — Strava authorization management
- `activities` — Recent activity listing

The handlers are intentionally small and wire together the library
components: the auth manager, the Strava client, the chat backend, and the
session layer.
*/

pub mod activities;
pub mod auth;
pub mod chat;

use std::sync::Arc;

use crate::auth::{AuthManager, ConsoleAuthorizer, FileTokenStore, OAuthClient};
use crate::config::Config;
use crate::error::Result;

/// Builds an [`AuthManager`] wired for interactive use.
pub(crate) fn build_auth_manager(config: &Config) -> Result<AuthManager> {
    let store = FileTokenStore::new(config.resolved_tokens_dir())?;
    let oauth = OAuthClient::new(&config.strava)?;
    Ok(AuthManager::new(store, oauth, Arc::new(ConsoleAuthorizer)))
}
