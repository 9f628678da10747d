//! Authorization-code acquisition strategies
//!
//! When a user has no stored credentials and no working refresh token, the
//! only way forward is a fresh browser grant. The [`Authorizer`] trait is the
//! seam between the credential manager and whatever surface collects the
//! resulting code: an interactive prompt in the CLI, a scripted value in
//! tests, or a hard refusal in non-interactive contexts.

use async_trait::async_trait;
use colored::Colorize;
use rustyline::DefaultEditor;

use crate::error::{CoachError, Result};

/// Source of authorization codes for the interactive grant flow.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Obtains an authorization code for `user`, given the URL the user must
    /// open to grant access.
    async fn obtain_code(&self, user: &str, authorize_url: &str) -> Result<String>;
}

/// Interactive authorizer: prints the grant URL and reads the code from the
/// terminal.
///
/// The user opens the URL, approves access, and pastes back either the bare
/// code or the full redirect URL; a `code=` query parameter is extracted
/// when present.
pub struct ConsoleAuthorizer;

impl ConsoleAuthorizer {
    /// Pulls the authorization code out of user input.
    ///
    /// Accepts either the bare code or a pasted redirect URL containing a
    /// `code` query parameter.
    fn extract_code(input: &str) -> String {
        let trimmed = input.trim();
        if let Ok(url) = url::Url::parse(trimmed) {
            if let Some((_, code)) = url.query_pairs().find(|(k, _)| k == "code") {
                return code.into_owned();
            }
        }
        trimmed.to_string()
    }
}

#[async_trait]
impl Authorizer for ConsoleAuthorizer {
    async fn obtain_code(&self, user: &str, authorize_url: &str) -> Result<String> {
        println!();
        println!(
            "{}",
            format!("Authorization required for user '{}'.", user).yellow()
        );
        println!("Open this URL in your browser and approve access:");
        println!();
        println!("  {}", authorize_url.cyan());
        println!();

        let mut editor = DefaultEditor::new()
            .map_err(|e| CoachError::Config(format!("Failed to open prompt: {}", e)))?;
        let input = editor
            .readline("Paste the code (or full redirect URL): ")
            .map_err(|e| {
                CoachError::AuthorizationRequired(format!("{} (prompt closed: {})", user, e))
            })?;

        let code = Self::extract_code(&input);
        if code.is_empty() {
            return Err(CoachError::AuthorizationRequired(user.to_string()).into());
        }
        Ok(code)
    }
}

/// Scripted authorizer that always returns a fixed code. Used in tests.
pub struct StaticAuthorizer {
    code: String,
}

impl StaticAuthorizer {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn obtain_code(&self, _user: &str, _authorize_url: &str) -> Result<String> {
        Ok(self.code.clone())
    }
}

/// Authorizer for non-interactive contexts: always refuses.
///
/// Surfaces the required-re-authorization state as an error instead of
/// blocking on input that will never arrive.
pub struct DenyAuthorizer;

#[async_trait]
impl Authorizer for DenyAuthorizer {
    async fn obtain_code(&self, user: &str, _authorize_url: &str) -> Result<String> {
        Err(CoachError::AuthorizationRequired(user.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_from_bare_code() {
        assert_eq!(ConsoleAuthorizer::extract_code("  abc123  "), "abc123");
    }

    #[test]
    fn test_extract_code_from_redirect_url() {
        let input = "http://localhost:8080/callback?state=&code=deadbeef&scope=read";
        assert_eq!(ConsoleAuthorizer::extract_code(input), "deadbeef");
    }

    #[test]
    fn test_extract_code_from_url_without_code_falls_back_to_input() {
        let input = "http://localhost:8080/callback?error=access_denied";
        assert_eq!(ConsoleAuthorizer::extract_code(input), input);
    }

    #[tokio::test]
    async fn test_static_authorizer_returns_its_code() {
        let authorizer = StaticAuthorizer::new("code42");
        let code = authorizer.obtain_code("alice", "http://example").await;
        assert_eq!(code.unwrap(), "code42");
    }

    #[tokio::test]
    async fn test_deny_authorizer_refuses() {
        let authorizer = DenyAuthorizer;
        let result = authorizer.obtain_code("alice", "http://example").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("alice"));
    }
}
