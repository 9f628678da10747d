//! Configuration management for Stridecoach
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Stridecoach
///
/// This structure holds all configuration needed by the application:
/// Strava OAuth credentials, the chat backend settings, and session
/// limits. It is constructed explicitly in `main` and passed into the
/// components that need it; there is no global configuration state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Strava API and OAuth configuration
    #[serde(default)]
    pub strava: StravaConfig,

    /// Chat completion backend configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Conversation/session limits
    #[serde(default)]
    pub session: SessionConfig,

    /// Override for the token store directory (defaults to the platform
    /// data dir)
    #[serde(default)]
    pub tokens_dir: Option<PathBuf>,
}

/// Strava API and OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaConfig {
    /// OAuth application client ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth application client secret
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Redirect URI registered with the OAuth application
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Base URL for the Strava data API
    #[serde(default = "default_strava_api_base")]
    pub api_base: String,

    /// Base URL for the Strava OAuth endpoints (separate from the data
    /// API so tests can point token exchange at a mock server)
    #[serde(default = "default_strava_auth_base")]
    pub auth_base: String,

    /// Default number of recent activities to fetch for a session
    #[serde(default = "default_max_activities")]
    pub max_activities: usize,
}

fn default_redirect_uri() -> String {
    "http://localhost:8080/callback".to_string()
}

fn default_strava_api_base() -> String {
    "https://www.strava.com/api/v3".to_string()
}

fn default_strava_auth_base() -> String {
    "https://www.strava.com".to_string()
}

fn default_max_activities() -> usize {
    10
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: default_redirect_uri(),
            api_base: default_strava_api_base(),
            auth_base: default_strava_auth_base(),
            max_activities: default_max_activities(),
        }
    }
}

/// Chat completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key for the chat backend
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier to request
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Base URL for the chat completion API
    #[serde(default = "default_openai_base")]
    pub api_base: String,

    /// Maximum tokens for a single reply
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_reply_tokens() -> usize {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            api_base: default_openai_base(),
            max_reply_tokens: default_max_reply_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Conversation/session limits
///
/// The context budget deliberately leaves headroom below the model's full
/// context window so a bounded reply always fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Estimated-token budget for the conversation before compaction
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// Message-count ceiling before compaction
    #[serde(default = "default_max_messages")]
    pub max_messages_before_compaction: usize,

    /// Number of most-recent messages preserved verbatim by compaction
    #[serde(default = "default_preserved_tail")]
    pub preserved_tail: usize,

    /// Number of most-recent messages kept when summarization itself fails
    #[serde(default = "default_fallback_tail")]
    pub fallback_tail: usize,
}

fn default_max_context_tokens() -> usize {
    3000
}

fn default_max_messages() -> usize {
    20
}

fn default_preserved_tail() -> usize {
    8
}

fn default_fallback_tail() -> usize {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            max_messages_before_compaction: default_max_messages(),
            preserved_tail: default_preserved_tail(),
            fallback_tail: default_fallback_tail(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoachError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CoachError::Config(format!("Failed to parse config: {}", e)).into())
    }

    /// Apply environment variable overrides
    ///
    /// The variable names mirror the usual Strava/OpenAI conventions so
    /// an existing `.env` style setup carries over directly.
    fn apply_env_vars(&mut self) {
        if let Ok(client_id) = std::env::var("STRAVA_CLIENT_ID") {
            self.strava.client_id = Some(client_id);
        }

        if let Ok(client_secret) = std::env::var("STRAVA_CLIENT_SECRET") {
            self.strava.client_secret = Some(client_secret);
        }

        if let Ok(redirect_uri) = std::env::var("STRAVA_REDIRECT_URI") {
            self.strava.redirect_uri = redirect_uri;
        }

        if let Ok(api_base) = std::env::var("STRAVA_BASE_URL") {
            self.strava.api_base = api_base;
        }

        if let Ok(auth_base) = std::env::var("STRAVA_AUTH_BASE") {
            self.strava.auth_base = auth_base;
        }

        if let Ok(max_activities) = std::env::var("MAX_ACTIVITIES") {
            if let Ok(value) = max_activities.parse() {
                self.strava.max_activities = value;
            } else {
                tracing::warn!("Invalid MAX_ACTIVITIES: {}", max_activities);
            }
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("OPENAI_BASE_URL") {
            self.openai.api_base = api_base;
        }

        if let Ok(tokens_dir) = std::env::var("STRIDECOACH_TOKENS_DIR") {
            self.tokens_dir = Some(PathBuf::from(tokens_dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all required credentials are present and limits are sane.
    /// Missing credentials produce a message naming the environment
    /// variables to set.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` naming every missing or invalid field
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.strava.client_id.is_none() || self.strava.client_secret.is_none() {
            missing.push("STRAVA_CLIENT_ID + STRAVA_CLIENT_SECRET");
        }

        if self.openai.api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }

        if !missing.is_empty() {
            return Err(CoachError::Config(format!(
                "missing required credentials: {}. Set them in the environment or the config file",
                missing.join(", ")
            ))
            .into());
        }

        if self.session.preserved_tail >= self.session.max_messages_before_compaction {
            return Err(CoachError::Config(format!(
                "session.preserved_tail ({}) must be below session.max_messages_before_compaction ({})",
                self.session.preserved_tail, self.session.max_messages_before_compaction
            ))
            .into());
        }

        if self.session.max_context_tokens == 0 {
            return Err(
                CoachError::Config("session.max_context_tokens must be non-zero".to_string())
                    .into(),
            );
        }

        Ok(())
    }

    /// True when both Strava OAuth credentials are configured
    pub fn has_oauth_config(&self) -> bool {
        self.strava.client_id.is_some() && self.strava.client_secret.is_some()
    }

    /// Directory where token records are stored.
    ///
    /// Uses the configured override when set, otherwise the platform data
    /// directory (e.g. `~/.local/share/stridecoach/tokens` on Linux), with
    /// a dot-directory under `$HOME` as a last resort.
    pub fn resolved_tokens_dir(&self) -> PathBuf {
        if let Some(dir) = &self.tokens_dir {
            return dir.clone();
        }
        if let Some(dirs) = directories::ProjectDirs::from("", "", "stridecoach") {
            return dirs.data_dir().join("tokens");
        }
        PathBuf::from(".stridecoach").join("tokens")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.strava.client_id = Some("12345".to_string());
        config.strava.client_secret = Some("secret".to_string());
        config.openai.api_key = Some("sk-test".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.strava.api_base, "https://www.strava.com/api/v3");
        assert_eq!(config.strava.max_activities, 10);
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.session.max_context_tokens, 3000);
        assert_eq!(config.session.max_messages_before_compaction, 20);
        assert_eq!(config.session.preserved_tail, 8);
        assert_eq!(config.session.fallback_tail, 10);
    }

    #[test]
    fn test_validate_missing_credentials() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("STRAVA_CLIENT_ID"));
        assert!(msg.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_validate_configured() {
        let config = configured();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tail_at_or_above_ceiling() {
        let mut config = configured();
        config.session.preserved_tail = 20;
        config.session.max_messages_before_compaction = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_context_budget() {
        let mut config = configured();
        config.session.max_context_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_has_oauth_config() {
        let mut config = Config::default();
        assert!(!config.has_oauth_config());
        config.strava.client_id = Some("12345".to_string());
        assert!(!config.has_oauth_config());
        config.strava.client_secret = Some("secret".to_string());
        assert!(config.has_oauth_config());
    }

    #[test]
    fn test_parse_yaml_with_partial_fields() {
        let yaml = r#"
strava:
  client_id: "12345"
openai:
  model: "gpt-4o-mini"
session:
  max_messages_before_compaction: 30
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.strava.client_id, Some("12345".to_string()));
        // Unspecified fields fall back to defaults
        assert_eq!(config.strava.redirect_uri, "http://localhost:8080/callback");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.session.max_messages_before_compaction, 30);
        assert_eq!(config.session.preserved_tail, 8);
    }

    #[test]
    fn test_parse_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
        assert!(config.tokens_dir.is_none());
    }
}
