//! Authentication module for the report-portal server.
//!
//! This module provides:
//! - The identity client for the provider's authorization-code flow
//! - Login, callback and logout routes
//! - Authentication extractors for Axum routes
//!
//! # Session model
//!
//! A browser moves from anonymous, to waiting on the provider (an
//! `auth_state` cookie is outstanding), to signed in (its `session` cookie
//! names a session that carries an account). Logout or idle expiry returns
//! it to anonymous. Sessions live only in the [`SessionStore`]; cookies
//! carry nothing but the opaque identifier.

pub mod cookies;
pub mod middleware;
pub mod oidc;
pub mod routes;

use crate::config::SessionConfig;
use report_portal_access::{ResourceCatalog, SessionStore};
use std::sync::Arc;

pub use middleware::{AuthRejection, OptionalAuth, RequireAuth};
pub use oidc::{AuthorizationRequestState, IdentityClient};
pub use routes::{AuthError, callback, login, logout};

/// Shared application state.
pub struct AppState {
    /// Client for the identity provider.
    pub identity: IdentityClient,
    /// Session storage.
    pub sessions: Arc<dyn SessionStore>,
    /// Dashboards addressable by group key.
    pub resources: Arc<dyn ResourceCatalog>,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        identity: IdentityClient,
        sessions: Arc<dyn SessionStore>,
        resources: Arc<dyn ResourceCatalog>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            identity,
            sessions,
            resources,
            session_config,
        }
    }
}
