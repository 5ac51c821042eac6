//! The identity record established by a successful login.

use serde::{Deserialize, Serialize};

/// Identity claims issued by the provider for a signed-in user.
///
/// The record is produced once, by the token exchange, and is treated as
/// authoritative for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    /// The subject claim (unique user identifier from the provider).
    pub subject: String,
    /// Human readable name (from `name`, `preferred_username`, or the subject).
    pub display_name: String,
    /// The directory tenant the user signed in through, when the provider reports one.
    pub tenant_id: Option<String>,
    /// The sign-in name, usually an email address.
    pub username: Option<String>,
}

impl AuthenticatedAccount {
    /// Creates an account with the required claims.
    #[must_use]
    pub fn new(subject: String, display_name: String) -> Self {
        Self {
            subject,
            display_name,
            tenant_id: None,
            username: None,
        }
    }

    /// Sets the tenant identifier.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Sets the sign-in name.
    #[must_use]
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }
}
