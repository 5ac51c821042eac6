//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ProviderConfigurationError`: identity provider settings are missing or invalid
//! - `TokenExchangeError`: the authorization code could not be turned into an identity
//! - `NotFoundError`: unknown route or resource key
//! - `SessionStoreError`: the session store could not serve the request
//!
//! None of the `Display` output is meant for browsers. The web layer maps
//! each family to a fixed, generic response.

use std::fmt;

/// Identity provider configuration is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfigurationError {
    /// A required setting was not supplied.
    MissingSetting { setting: &'static str },
    /// A setting was supplied but could not be used.
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },
}

impl fmt::Display for ProviderConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting { setting } => {
                write!(f, "missing identity provider setting: {setting}")
            }
            Self::InvalidSetting { setting, reason } => {
                write!(f, "invalid identity provider setting '{setting}': {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderConfigurationError {}

/// Exchanging an authorization code for an identity failed.
///
/// Every variant is terminal for the login attempt. Authorization codes are
/// single-use, so retrying with the same code cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenExchangeError {
    /// The provider reported an error on the redirect instead of a code.
    ProviderDenied {
        error: String,
        description: Option<String>,
    },
    /// The token request could not be formed.
    InvalidRequest { details: String },
    /// The token endpoint could not be reached.
    Transport { details: String },
    /// The token endpoint did not answer in time.
    Timeout { seconds: u64 },
    /// The provider rejected the exchange (e.g. `invalid_grant` for a reused code).
    Rejected {
        error: String,
        description: Option<String>,
    },
    /// The token response could not be parsed.
    MalformedResponse { details: String },
    /// The token response carried no ID token.
    MissingIdToken,
    /// The ID token could not be decoded.
    MalformedIdToken { details: String },
    /// The ID token nonce does not match the login attempt.
    NonceMismatch,
}

impl fmt::Display for TokenExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderDenied { error, description } => match description {
                Some(description) => write!(f, "provider denied login: {error}: {description}"),
                None => write!(f, "provider denied login: {error}"),
            },
            Self::InvalidRequest { details } => {
                write!(f, "invalid token request: {details}")
            }
            Self::Transport { details } => {
                write!(f, "token endpoint unreachable: {details}")
            }
            Self::Timeout { seconds } => {
                write!(f, "token exchange timed out after {seconds}s")
            }
            Self::Rejected { error, description } => match description {
                Some(description) => write!(f, "token exchange rejected: {error}: {description}"),
                None => write!(f, "token exchange rejected: {error}"),
            },
            Self::MalformedResponse { details } => {
                write!(f, "malformed token response: {details}")
            }
            Self::MissingIdToken => write!(f, "token response has no id_token"),
            Self::MalformedIdToken { details } => {
                write!(f, "malformed id_token: {details}")
            }
            Self::NonceMismatch => write!(f, "id_token nonce does not match login attempt"),
        }
    }
}

impl std::error::Error for TokenExchangeError {}

/// The requested route or resource does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// No route matched the path.
    Route { path: String },
    /// No resource descriptor is registered under the key.
    Resource { key: String },
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route { path } => write!(f, "no route for '{path}'"),
            Self::Resource { key } => write!(f, "no resource registered for '{key}'"),
        }
    }
}

impl std::error::Error for NotFoundError {}

/// The session store could not complete an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The backing store is unavailable.
    Unavailable { details: String },
    /// A session identifier could not be generated.
    IdGeneration { details: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => {
                write!(f, "session store unavailable: {details}")
            }
            Self::IdGeneration { details } => {
                write!(f, "failed to generate session id: {details}")
            }
        }
    }
}

impl std::error::Error for SessionStoreError {}
