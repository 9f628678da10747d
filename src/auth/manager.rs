//! Credential lifecycle management
//!
//! [`AuthManager`] sits between callers that just want a usable access token
//! and the moving parts beneath: the on-disk [`FileTokenStore`], the HTTP
//! [`OAuthClient`], and an [`Authorizer`] for the interactive grant flow.
//!
//! The lifecycle for a user is: no record (never authorized), valid record
//! (access token usable as-is), stale record (refresh first), and dead
//! record (refresh rejected, full re-authorization required). A failed
//! refresh never deletes the stored record; the refresh token may still work
//! on a later attempt, and the record carries athlete identity worth keeping.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::authorizer::Authorizer;
use crate::auth::flow::{OAuthClient, TokenResponse};
use crate::auth::token_store::{FileTokenStore, TokenRecord};
use crate::error::Result;

/// Orchestrates token storage, refresh, and re-authorization per user.
pub struct AuthManager {
    store: FileTokenStore,
    oauth: OAuthClient,
    authorizer: Arc<dyn Authorizer>,
}

impl AuthManager {
    pub fn new(store: FileTokenStore, oauth: OAuthClient, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            store,
            oauth,
            authorizer,
        }
    }

    /// Returns a currently-valid access token for `user`.
    ///
    /// Resolution order: a stored valid token is returned directly; a stale
    /// token with a refresh token is refreshed and the record re-saved; a
    /// rejected refresh, a stale token with no refresh token, or no stored
    /// record at all falls through to the full authorization flow via the
    /// configured [`Authorizer`].
    ///
    /// # Errors
    ///
    /// Returns `CoachError::AuthorizationRequired` when re-authorization is
    /// needed and the authorizer cannot supply a code, or the underlying
    /// exchange/storage errors.
    pub async fn access_token(&self, user: &str) -> Result<String> {
        match self.store.load(user)? {
            Some(record) if record.is_valid() => {
                tracing::debug!(user, "stored token still valid");
                Ok(record.access_token)
            }
            Some(record) => match record.refresh_token {
                Some(refresh_token) => match self.oauth.refresh(&refresh_token).await {
                    Ok(tokens) => {
                        info!(user, "refreshed access token");
                        let saved = self.save_tokens(user, tokens, record.athlete)?;
                        Ok(saved.access_token)
                    }
                    Err(e) => {
                        // The record stays on disk: the refresh token may be
                        // temporarily rejected, and the athlete profile is
                        // kept.
                        warn!(user, error = %e, "token refresh failed, re-authorizing");
                        let saved = self.authorize(user).await?;
                        Ok(saved.access_token)
                    }
                },
                None => {
                    // Dead record: expired with nothing to refresh with.
                    info!(user, "expired token has no refresh token, re-authorizing");
                    let saved = self.authorize(user).await?;
                    Ok(saved.access_token)
                }
            },
            None => {
                info!(user, "no stored credentials, starting authorization");
                let saved = self.authorize(user).await?;
                Ok(saved.access_token)
            }
        }
    }

    /// Runs the full authorization flow for `user` regardless of any stored
    /// record, and persists the resulting tokens.
    pub async fn login(&self, user: &str) -> Result<TokenRecord> {
        self.authorize(user).await
    }

    /// Revokes `user`'s access: best-effort remote deauthorization followed
    /// by unconditional local deletion.
    ///
    /// A remote failure (network down, token already dead) is logged and
    /// ignored; the local record is deleted either way. Returns `true` when
    /// a record existed locally.
    pub async fn revoke(&self, user: &str) -> Result<bool> {
        let record = self.store.load(user)?;
        let existed = record.is_some();

        if let Some(record) = record {
            if let Err(e) = self.oauth.deauthorize(&record.access_token).await {
                warn!(user, error = %e, "remote deauthorization failed, deleting local record anyway");
            } else {
                info!(user, "deauthorized remotely");
            }
        }

        self.store.delete(user)?;
        Ok(existed)
    }

    /// Stored credential records, one per user, sorted by user id.
    pub fn list_records(&self) -> Result<Vec<TokenRecord>> {
        self.store.list()
    }

    /// Users with a stored credential record.
    pub fn list_users(&self) -> Result<Vec<String>> {
        Ok(self.store.list()?.into_iter().map(|r| r.user_id).collect())
    }

    /// The stored record for `user`, if any. Makes no network calls.
    pub fn token_info(&self, user: &str) -> Result<Option<TokenRecord>> {
        self.store.load(user)
    }

    async fn authorize(&self, user: &str) -> Result<TokenRecord> {
        let url = self.oauth.authorize_url()?;
        let code = self.authorizer.obtain_code(user, &url).await?;
        let tokens = self.oauth.exchange_code(&code).await?;
        info!(user, "authorization code exchanged");
        self.save_tokens(user, tokens, None)
    }

    /// Persists a token response, carrying forward a previously stored
    /// athlete profile when the response has none (refresh responses never
    /// include one). Returns the record as stamped by the store.
    fn save_tokens(
        &self,
        user: &str,
        tokens: TokenResponse,
        previous_athlete: Option<serde_json::Value>,
    ) -> Result<TokenRecord> {
        let record = TokenRecord {
            user_id: user.to_string(),
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            expires_at: tokens.expires_at,
            athlete: tokens.athlete.or(previous_athlete),
            created_at: None,
            updated_at: None,
        };
        self.store.save(user, &record)
    }
}
