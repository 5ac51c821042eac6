//! Authentication routes for login, callback, and logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use report_portal_access::{SessionId, SessionStoreError, TokenExchangeError};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, cookies};

/// Query parameters for the OIDC callback.
///
/// Every field is optional so that a provider error redirect, which carries
/// no code, still reaches the handler.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let oidc = state.identity.config();
    let (auth_url, auth_state) = state
        .identity
        .authorization_url(&oidc.scopes(), oidc.redirect_uri())
        .map_err(|e| AuthError::ProviderConfiguration(e.to_string()))?;

    let auth_state = auth_state.with_return_to(cookies::return_to(&jar));
    let secure = state.session_config.secure_cookies;
    let cookie = cookies::auth_state_cookie(&auth_state, secure)
        .map_err(|e| AuthError::ProviderConfiguration(format!("encode auth state: {e}")))?;

    tracing::debug!("redirecting to identity provider");
    let jar = jar.add(cookie).add(cookies::clear_return_to_cookie());
    Ok((jar, Redirect::to(&auth_url)))
}

/// Handles the OIDC callback after the user authenticates with the identity provider.
///
/// A session is written only after the code exchange succeeds. Any failure
/// clears the pending login so the browser starts over from anonymous.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    // Retrieve and validate auth state from cookie
    let auth_state = match cookies::auth_state(&jar) {
        cookies::AuthStateCookie::Present(auth_state) => auth_state,
        cookies::AuthStateCookie::Missing => return Err(AuthError::MissingAuthState),
        cookies::AuthStateCookie::Invalid => return Err(AuthError::InvalidAuthState),
    };

    if let Some(error) = query.error {
        let denied = TokenExchangeError::ProviderDenied {
            error,
            description: query.error_description,
        };
        return Err(AuthError::ProviderDenied(denied.to_string()));
    }

    // Validate CSRF token
    if query.state.as_deref() != Some(auth_state.csrf_token.as_str()) {
        return Err(AuthError::CsrfMismatch);
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingCode)?;

    // Exchange the authorization code for the signed-in account
    let oidc = state.identity.config();
    let account = state
        .identity
        .exchange_code(&code, &oidc.scopes(), oidc.redirect_uri(), &auth_state)
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    // Rotate the session identifier so a pre-login cookie never becomes authenticated
    if let Some(previous) = cookies::session_id(&jar) {
        if let Err(e) = state.sessions.destroy(&previous).await {
            tracing::warn!(error = %e, "failed to destroy previous session");
        }
    }

    let session_id = SessionId::generate().map_err(session_id_unavailable)?;
    let subject = account.subject.clone();
    state
        .sessions
        .set_authenticated_account(&session_id, account)
        .await
        .map_err(|e| AuthError::SessionStore(e.to_string()))?;

    tracing::info!(subject = %subject, "login succeeded");

    let destination = auth_state
        .return_to
        .as_deref()
        .and_then(cookies::local_path)
        .unwrap_or("/")
        .to_string();

    let jar = jar
        .add(cookies::session_cookie(
            &session_id,
            state.session_config.secure_cookies,
        ))
        .add(cookies::clear_auth_state_cookie());

    Ok((jar, Redirect::to(&destination)))
}

/// Logs out the user by deleting their session.
///
/// Always redirects home; store failures are only logged.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_id) = cookies::session_id(&jar) {
        match state.sessions.destroy(&session_id).await {
            Ok(()) => tracing::info!("logout"),
            Err(e) => tracing::warn!(error = %e, "failed to destroy session on logout"),
        }
    }

    (jar.add(cookies::clear_session_cookie()), Redirect::to("/"))
}

fn session_id_unavailable(e: impl std::fmt::Display) -> AuthError {
    let err = SessionStoreError::IdGeneration {
        details: e.to_string(),
    };
    AuthError::SessionStore(err.to_string())
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    MissingAuthState,
    InvalidAuthState,
    CsrfMismatch,
    MissingCode,
    ProviderDenied(String),
    TokenExchange(String),
    ProviderConfiguration(String),
    SessionStore(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing auth state"),
            Self::InvalidAuthState => (StatusCode::BAD_REQUEST, "Invalid auth state"),
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "CSRF token mismatch"),
            Self::MissingCode => (StatusCode::BAD_REQUEST, "Missing authorization code"),
            Self::ProviderDenied(msg) => {
                tracing::warn!("Identity provider denied login: {}", msg);
                (StatusCode::BAD_REQUEST, "Authentication failed")
            }
            Self::TokenExchange(msg) => {
                tracing::error!("Token exchange failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::ProviderConfiguration(msg) => {
                tracing::error!("Identity provider misconfigured: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::SessionStore(msg) => {
                tracing::error!("Session store error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let jar = CookieJar::new().add(cookies::clear_auth_state_cookie());
        (status, jar, message).into_response()
    }
}
