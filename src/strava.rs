//! Strava REST API client for workout data
//!
//! Fetches are best-effort: the coaching session is still useful with no
//! activity data, so failures here return empty results with a warning
//! instead of an error. Activities stay as raw JSON values; the API's
//! activity shape is large and not contractual, and the model consumes it
//! verbatim.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::StravaConfig;
use crate::error::{CoachError, Result};

/// Timeout for Strava API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Strava v3 REST API.
pub struct StravaClient {
    client: Client,
    api_base: String,
}

impl StravaClient {
    pub fn new(config: &StravaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("stridecoach/0.2.0")
            .build()
            .map_err(|e| CoachError::Upstream(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    /// Fetches the athlete's most recent activities, newest first.
    ///
    /// Any failure (network, auth, malformed body) logs a warning and
    /// returns an empty list; there is no retry.
    pub async fn fetch_recent_activities(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Vec<serde_json::Value> {
        let url = format!("{}/athlete/activities", self.api_base);
        let result = self
            .get_json(&url, access_token, &[("per_page", limit.to_string())])
            .await;

        match result {
            Ok(serde_json::Value::Array(activities)) => {
                debug!(count = activities.len(), "fetched recent activities");
                activities
            }
            Ok(other) => {
                warn!(body = %other, "unexpected activities response shape");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch activities");
                Vec::new()
            }
        }
    }

    /// Fetches the authenticated athlete's profile.
    ///
    /// Same failure posture as activities: `None` with a warning.
    pub async fn fetch_athlete(&self, access_token: &str) -> Option<serde_json::Value> {
        let url = format!("{}/athlete", self.api_base);
        match self.get_json(&url, access_token, &[]).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "failed to fetch athlete profile");
                None
            }
        }
    }

    async fn get_json(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| CoachError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::Upstream(format!("HTTP {}: {}", status, body)).into());
        }

        let body = response
            .json()
            .await
            .map_err(|e| CoachError::Upstream(format!("Failed to parse response: {}", e)))?;
        Ok(body)
    }
}
