//! OAuth credential lifecycle: storage, refresh, and authorization
//!
//! [`FileTokenStore`] persists per-user token records on disk,
//! [`OAuthClient`] performs the HTTP exchanges, [`Authorizer`]
//! implementations supply authorization codes, and [`AuthManager`] ties the
//! three together into a "give me a usable access token" API.

pub mod authorizer;
pub mod flow;
pub mod manager;
pub mod token_store;

pub use authorizer::{Authorizer, ConsoleAuthorizer, DenyAuthorizer, StaticAuthorizer};
pub use flow::{OAuthClient, TokenResponse, OAUTH_SCOPE};
pub use manager::AuthManager;
pub use token_store::{FileTokenStore, TokenRecord, EXPIRY_BUFFER_SECS};
