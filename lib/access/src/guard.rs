//! The access predicate applied to protected routes.
//!
//! The guard only answers whether a session is signed in. Deciding what to
//! do with an anonymous request (redirect into login) belongs to the caller.

use std::fmt;

use crate::session::Session;

/// Returns true iff the session exists and carries an account.
#[must_use]
pub fn is_authenticated(session: Option<&Session>) -> bool {
    session.is_some_and(Session::is_authenticated)
}

/// Where a browser is in the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// No signed-in session and no login in progress.
    Anonymous,
    /// Redirected to the provider, waiting for the callback.
    AuthPending,
    /// Signed in.
    Authenticated,
}

impl FlowState {
    /// Derives the flow state from the stored session and whether an
    /// authorization request is outstanding for this browser.
    #[must_use]
    pub fn observe(session: Option<&Session>, login_pending: bool) -> Self {
        if is_authenticated(session) {
            Self::Authenticated
        } else if login_pending {
            Self::AuthPending
        } else {
            Self::Anonymous
        }
    }

    /// Returns the state's name for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::AuthPending => "auth_pending",
            Self::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
