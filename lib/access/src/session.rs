//! Browser sessions.
//!
//! A session correlates one browser (through a cookie-carried identifier)
//! with the account that signed in on it. Sessions are owned by a
//! [`SessionStore`](crate::store::SessionStore); callers only ever see copies.

use chrono::{DateTime, Duration, Utc};
use report_portal_core::{RandomnessUnavailable, random_token};
use serde::{Deserialize, Serialize};

use crate::account::AuthenticatedAccount;

/// Number of random bytes behind each session identifier.
const SESSION_ID_BYTES: usize = 32;

/// Unique identifier for a session.
///
/// Session IDs are opaque, unguessable strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from an existing string (e.g. a cookie value).
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh session ID from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS random source fails.
    pub fn generate() -> report_portal_core::Result<Self, RandomnessUnavailable> {
        random_token(SESSION_ID_BYTES).map(Self)
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Authentication state for one browser.
///
/// A session without an account is treated exactly like no session at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,
    /// The signed-in account, absent until login succeeds.
    account: Option<AuthenticatedAccount>,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// When the session was last used.
    last_accessed_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            account: None,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Creates a session that is already signed in.
    #[must_use]
    pub fn authenticated(id: SessionId, account: AuthenticatedAccount) -> Self {
        let mut session = Self::new(id);
        session.account = Some(account);
        session
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the signed-in account, if any.
    #[must_use]
    pub fn account(&self) -> Option<&AuthenticatedAccount> {
        self.account.as_ref()
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session was last used.
    #[must_use]
    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// Returns true if an account is attached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// Attaches the account and marks the session as used.
    pub fn set_account(&mut self, account: AuthenticatedAccount) {
        self.account = Some(account);
        self.touch();
    }

    /// Marks the session as used.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Returns true if the session has been idle for at least `idle_timeout`.
    #[must_use]
    pub fn is_idle_expired(&self, idle_timeout: Duration) -> bool {
        Utc::now() - self.last_accessed_at >= idle_timeout
    }
}
