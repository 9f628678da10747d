//! Error types for Stridecoach
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Stridecoach operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, credential lifecycle management, chat backend
/// interactions, and conversation management.
#[derive(Error, Debug)]
pub enum CoachError {
    /// Configuration-related errors (missing credentials, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No valid or refreshable token exists and interactive authorization
    /// is required to proceed
    #[error("Authorization required for user '{0}': run `stridecoach auth login --user {0}`")]
    AuthorizationRequired(String),

    /// Exchanging an authorization code for tokens failed
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Refreshing an expired token failed; callers fall back to full
    /// re-authorization rather than surfacing this directly
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Chat backend errors (API call failures, malformed responses)
    #[error("Chat backend error: {0}")]
    Upstream(String),

    /// Conversation summarization failed during compaction; internal to
    /// the context window manager, which falls back to lossy truncation
    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),

    /// Token store errors (read/write/list failures)
    #[error("Token store error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL construction errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Stridecoach operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = CoachError::Config("missing OPENAI_API_KEY".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: missing OPENAI_API_KEY"
        );
    }

    #[test]
    fn test_authorization_required_display() {
        let error = CoachError::AuthorizationRequired("runner42".to_string());
        let msg = error.to_string();
        assert!(msg.contains("runner42"));
        assert!(msg.contains("auth login"));
    }

    #[test]
    fn test_exchange_failed_display() {
        let error = CoachError::ExchangeFailed("HTTP 400: invalid code".to_string());
        assert_eq!(
            error.to_string(),
            "Token exchange failed: HTTP 400: invalid code"
        );
    }

    #[test]
    fn test_refresh_failed_display() {
        let error = CoachError::RefreshFailed("HTTP 401".to_string());
        assert_eq!(error.to_string(), "Token refresh failed: HTTP 401");
    }

    #[test]
    fn test_upstream_error_display() {
        let error = CoachError::Upstream("API timeout".to_string());
        assert_eq!(error.to_string(), "Chat backend error: API timeout");
    }

    #[test]
    fn test_summarization_failed_display() {
        let error = CoachError::SummarizationFailed("backend unavailable".to_string());
        assert_eq!(
            error.to_string(),
            "Summarization failed: backend unavailable"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let error = CoachError::Storage("permission denied".to_string());
        assert_eq!(error.to_string(), "Token store error: permission denied");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CoachError = io_error.into();
        assert!(matches!(error, CoachError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: CoachError = json_error.into();
        assert!(matches!(error, CoachError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: CoachError = yaml_error.into();
        assert!(matches!(error, CoachError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoachError>();
    }
}
