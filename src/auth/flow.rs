//! OAuth code exchange, refresh, and revocation over HTTP
//!
//! This module speaks the Strava OAuth wire protocol: building the browser
//! authorization URL, exchanging an authorization code for tokens, refreshing
//! an expired access token, and deauthorizing the application. Decisions
//! about when to do each of these live in the manager; this client only
//! performs the exchanges.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::StravaConfig;
use crate::error::{CoachError, Result};

/// Timeout for token endpoint requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Scopes requested during authorization.
///
/// `activity:read_all` covers private activities; plain `read` covers the
/// athlete profile.
pub const OAUTH_SCOPE: &str = "read,activity:read_all";

/// Token endpoint response for both code exchange and refresh.
///
/// Strava returns an absolute `expires_at` Unix timestamp, not `expires_in`
/// seconds. The athlete profile is present on code exchange only.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    #[serde(default)]
    pub athlete: Option<serde_json::Value>,
}

/// HTTP client for the OAuth endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_base: String,
}

impl OAuthClient {
    /// Builds a client from the Strava section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` when the client id or secret is missing.
    pub fn new(config: &StravaConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .clone()
            .ok_or_else(|| CoachError::Config("STRAVA_CLIENT_ID is not set".to_string()))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or_else(|| CoachError::Config("STRAVA_CLIENT_SECRET is not set".to_string()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("stridecoach/0.2.0")
            .build()
            .map_err(|e| CoachError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            redirect_uri: config.redirect_uri.clone(),
            auth_base: config.auth_base.clone(),
        })
    }

    /// Builds the URL the user opens in a browser to grant access.
    ///
    /// `approval_prompt=force` makes the consent screen appear even when the
    /// application was previously authorized, so re-authorization always
    /// yields a fresh code.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured auth base is not a valid URL.
    pub fn authorize_url(&self) -> Result<String> {
        let mut url = Url::parse(&format!("{}/oauth/authorize", self.auth_base))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("approval_prompt", "force")
            .append_pair("scope", OAUTH_SCOPE);
        Ok(url.into())
    }

    /// Exchanges an authorization code for a token set.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::ExchangeFailed`] when the server rejects the
    /// code or the response cannot be parsed.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        tracing::debug!("Exchanging authorization code for tokens");
        let response = self
            .client
            .post(format!("{}/oauth/token", self.auth_base))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| CoachError::ExchangeFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::ExchangeFailed(format!("HTTP {}: {}", status, body)).into());
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| CoachError::ExchangeFailed(format!("Invalid response: {}", e)))?;
        Ok(tokens)
    }

    /// Obtains a fresh access token using a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::RefreshFailed`] when the server rejects the
    /// refresh token or the response cannot be parsed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        tracing::debug!("Refreshing access token");
        let response = self
            .client
            .post(format!("{}/oauth/token", self.auth_base))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| CoachError::RefreshFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::RefreshFailed(format!("HTTP {}: {}", status, body)).into());
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| CoachError::RefreshFailed(format!("Invalid response: {}", e)))?;
        Ok(tokens)
    }

    /// Tells the server to revoke the application's access.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Upstream`] when the request fails; callers that
    /// treat remote revocation as best-effort can ignore the error.
    pub async fn deauthorize(&self, access_token: &str) -> Result<()> {
        tracing::debug!("Deauthorizing application");
        let response = self
            .client
            .post(format!("{}/oauth/deauthorize", self.auth_base))
            .form(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| CoachError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::Upstream(format!("HTTP {}: {}", status, body)).into());
        }
        Ok(())
    }
}
