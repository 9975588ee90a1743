//! Validated identifiers and values passed between the pipeline, the store
//! and the CLI.

use crate::error::MapscoutError;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Maximum accepted length of a search term, in characters.
const MAX_SEARCH_TERM_CHARS: usize = 256;

/// Newtype for user identifiers with validation.
///
/// User IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new `UserId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, MapscoutError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a new random `UserId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), MapscoutError> {
        static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = UUID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(MapscoutError::Validation(format!(
                "invalid user ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque bearer token identifying a user to the store.
///
/// Tokens are issued elsewhere; this type only checks that the value is
/// non-empty and free of whitespace. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserToken(String);

impl UserToken {
    /// Wrap a token string.
    ///
    /// A leading `Bearer ` scheme is stripped so header values can be passed
    /// through unchanged.
    pub fn new(token: impl Into<String>) -> Result<Self, MapscoutError> {
        let token = token.into();
        let token = token
            .strip_prefix("Bearer ")
            .map_or(token.as_str(), str::trim)
            .to_string();

        if token.is_empty() {
            return Err(MapscoutError::Validation("token must not be empty".to_string()));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(MapscoutError::Validation(
                "token must not contain whitespace".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserToken(***)")
    }
}

/// A free-text search term, trimmed and length-checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Create a search term from user input.
    ///
    /// # Errors
    /// Returns error if the trimmed term is empty or longer than 256 characters.
    pub fn new(term: impl AsRef<str>) -> Result<Self, MapscoutError> {
        let term = term.as_ref().trim();
        if term.is_empty() {
            return Err(MapscoutError::Validation(
                "search term must not be empty".to_string(),
            ));
        }
        let len = term.chars().count();
        if len > MAX_SEARCH_TERM_CHARS {
            return Err(MapscoutError::Validation(format!(
                "search term must be at most {MAX_SEARCH_TERM_CHARS} characters, got {len}"
            )));
        }
        Ok(Self(term.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UTC instant a search was requested.
///
/// Keeps full sub-second precision, which is what makes
/// (search term, timestamp) usable as a history key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse a stored `requested_at` value.
    pub fn from_rfc3339(s: &str) -> Result<Self, MapscoutError> {
        DateTime::parse_from_rfc3339(s)
            .map(|at| Self(at.with_timezone(&Utc)))
            .map_err(|e| MapscoutError::Validation(format!("timestamp {s:?}: {e}")))
    }

    /// RFC 3339 with as many fractional digits as the instant carries.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}
