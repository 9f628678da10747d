//! OAuth token persistence on the local filesystem
//!
//! Each user's token record is stored as a single JSON file under the token
//! directory, named after a sanitized form of the user key. File-per-user
//! storage keeps records independently replaceable and makes listing the
//! known users a plain directory scan.
//!
//! Writes are atomic: the record is serialized to a temporary file in the
//! same directory and renamed over the destination, so a crash mid-write
//! never leaves a truncated record behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoachError, Result};

/// Seconds before nominal expiry at which a token stops counting as valid.
///
/// The buffer leaves enough time to run a refresh exchange before the
/// resource server starts rejecting the access token.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// TokenRecord
// ---------------------------------------------------------------------------

/// A stored OAuth credential set for one user.
///
/// Fields map to the token endpoint response defined in RFC 6749; `expires_at`
/// is the absolute Unix timestamp computed from the server's `expires_in`
/// seconds, stored so that expiry can be determined without a round-trip.
///
/// # Examples
///
/// ```
/// use stridecoach::auth::TokenRecord;
///
/// let record = TokenRecord {
///     user_id: "alice".to_string(),
///     access_token: "acc".to_string(),
///     refresh_token: Some("ref".to_string()),
///     expires_at: chrono::Utc::now().timestamp() + 3600,
///     athlete: None,
///     created_at: None,
///     updated_at: None,
/// };
/// assert!(record.is_valid());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Key this record is stored under; stamped on save.
    #[serde(default)]
    pub user_id: String,

    /// Short-lived bearer token presented to the resource server.
    pub access_token: String,

    /// Long-lived token used to obtain a new access token.
    ///
    /// `None` marks a dead-end record: once the access token expires the
    /// only way forward is full re-authorization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Unix timestamp (seconds) at which the access token expires.
    pub expires_at: i64,

    /// Athlete profile returned alongside the initial code exchange.
    ///
    /// Kept opaque; the upstream shape is not contractual and refresh
    /// responses do not include it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub athlete: Option<serde_json::Value>,

    /// UTC timestamp of the first save of this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// UTC timestamp of the most recent save of this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Returns `true` while the access token is usable.
    ///
    /// A token within [`EXPIRY_BUFFER_SECS`] of its nominal expiry is already
    /// considered invalid so that callers refresh before the server rejects
    /// it.
    ///
    /// # Examples
    ///
    /// ```
    /// use stridecoach::auth::TokenRecord;
    ///
    /// let now = chrono::Utc::now().timestamp();
    /// let fresh = TokenRecord {
    ///     user_id: "alice".to_string(),
    ///     access_token: "acc".to_string(),
    ///     refresh_token: Some("ref".to_string()),
    ///     expires_at: now + 3600,
    ///     athlete: None,
    ///     created_at: None,
    ///     updated_at: None,
    /// };
    /// assert!(fresh.is_valid());
    ///
    /// // Expires in 60 seconds: inside the buffer, so no longer valid.
    /// let closing = TokenRecord { expires_at: now + 60, ..fresh };
    /// assert!(!closing.is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        Utc::now().timestamp() < self.expires_at - EXPIRY_BUFFER_SECS
    }

    /// Seconds until nominal expiry; negative once past it.
    pub fn seconds_until_expiry(&self) -> i64 {
        self.expires_at - Utc::now().timestamp()
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// Filesystem-backed store of [`TokenRecord`]s, one JSON file per user.
///
/// # Examples
///
/// ```no_run
/// use stridecoach::auth::{FileTokenStore, TokenRecord};
///
/// # fn example() -> stridecoach::error::Result<()> {
/// let store = FileTokenStore::new("/home/me/.stridecoach/tokens")?;
/// let record = TokenRecord {
///     user_id: "alice".to_string(),
///     access_token: "acc".to_string(),
///     refresh_token: Some("ref".to_string()),
///     expires_at: chrono::Utc::now().timestamp() + 3600,
///     athlete: None,
///     created_at: None,
///     updated_at: None,
/// };
/// store.save("alice", &record)?;
/// assert!(store.load("alice")?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a user key to a filesystem-safe file stem.
    ///
    /// Alphanumerics, `-`, `_`, and `.` pass through; every other character
    /// becomes `_`. A lone `.` is harmless once `.json` is appended, since
    /// the result is joined as a plain file name inside the store directory.
    /// Distinct keys can still collide after sanitization; the caller owns
    /// key hygiene.
    fn sanitize(user: &str) -> String {
        user.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn record_path(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::sanitize(user)))
    }

    /// Persists a [`TokenRecord`] for `user`, replacing any existing record.
    ///
    /// Stamps `user_id`, `updated_at` on every save, and `created_at` on the
    /// first save only; the stamped record is returned so callers see the
    /// values that actually hit disk. The write goes through a temporary
    /// file in the same directory and a rename, so concurrent readers never
    /// observe a partial record.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Storage`] when the directory cannot be written.
    pub fn save(&self, user: &str, record: &TokenRecord) -> Result<TokenRecord> {
        let mut stamped = record.clone();
        stamped.user_id = user.to_string();
        stamped.updated_at = Some(Utc::now());
        if stamped.created_at.is_none() {
            stamped.created_at = self
                .load(user)?
                .and_then(|existing| existing.created_at)
                .or(stamped.updated_at);
        }

        let json = serde_json::to_string_pretty(&stamped)?;
        let path = self.record_path(user);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            CoachError::Storage(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            CoachError::Storage(format!("failed to replace {}: {}", path.display(), e))
        })?;

        debug!(user, path = %path.display(), "saved token record");
        Ok(stamped)
    }

    /// Loads the stored record for `user`.
    ///
    /// Returns `Ok(None)` when no record exists, so callers can distinguish
    /// "not authorized yet" from a storage failure.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Serialization`] when the stored JSON is
    /// malformed.
    pub fn load(&self, user: &str) -> Result<Option<TokenRecord>> {
        let path = self.record_path(user);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: TokenRecord = serde_json::from_str(&json)?;
        Ok(Some(record))
    }

    /// Deletes the stored record for `user`.
    ///
    /// A no-op when no record exists, so it is safe to call unconditionally.
    pub fn delete(&self, user: &str) -> Result<()> {
        let path = self.record_path(user);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(user, "deleted token record");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists every stored record, sorted by `user_id` for stable output.
    ///
    /// Non-JSON files in the directory are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Serialization`] when any stored JSON is
    /// malformed.
    pub fn list(&self) -> Result<Vec<TokenRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read_to_string(&path)?;
            let record: TokenRecord = serde_json::from_str(&json)?;
            records.push(record);
        }
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
