//! Authentication extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use report_portal_access::{AuthenticatedAccount, FlowState, SessionId, is_authenticated};
use std::sync::Arc;

use super::{AppState, cookies};

/// Extractor for requiring a signed-in account.
///
/// Anonymous requests are redirected to `/login`; the requested path is
/// remembered so the browser lands back on it after the callback.
pub struct RequireAuth {
    pub session_id: SessionId,
    pub account: AuthenticatedAccount,
}

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let secure_cookies = app_state.session_config.secure_cookies;
        let jar = CookieJar::from_headers(&parts.headers);

        let not_authenticated = || AuthRejection::NotAuthenticated {
            return_to: parts
                .uri
                .path_and_query()
                .and_then(|pq| cookies::local_path(pq.as_str()))
                .map(str::to_string),
            secure_cookies,
        };

        let Some(session_id) = cookies::session_id(&jar) else {
            return Err(not_authenticated());
        };

        let session = app_state.sessions.load(&session_id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to load session");
            AuthRejection::StoreUnavailable
        })?;

        let login_pending = jar.get(cookies::AUTH_STATE_COOKIE).is_some();
        let flow = FlowState::observe(session.as_ref(), login_pending);
        tracing::debug!(flow = %flow, path = %parts.uri.path(), "auth guard");

        let account = session
            .filter(|session| is_authenticated(Some(session)))
            .and_then(|session| session.account().cloned());
        let Some(account) = account else {
            return Err(not_authenticated());
        };

        if let Err(e) = app_state.sessions.touch(&session_id).await {
            tracing::warn!(error = %e, "failed to refresh session access time");
        }

        Ok(RequireAuth {
            session_id,
            account,
        })
    }
}

/// Extractor for optionally getting the signed-in account.
///
/// Returns None if the browser is not signed in. A store failure still
/// rejects the request.
pub struct OptionalAuth(pub Option<AuthenticatedAccount>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match RequireAuth::from_request_parts(parts, state).await {
            Ok(auth) => Ok(OptionalAuth(Some(auth.account))),
            Err(AuthRejection::NotAuthenticated { .. }) => Ok(OptionalAuth(None)),
            Err(rejection) => Err(rejection),
        }
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated {
        return_to: Option<String>,
        secure_cookies: bool,
    },
    StoreUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated {
                return_to,
                secure_cookies,
            } => {
                let jar = match return_to {
                    Some(path) => {
                        CookieJar::new().add(cookies::return_to_cookie(&path, secure_cookies))
                    }
                    None => CookieJar::new(),
                };
                (jar, Redirect::to("/login")).into_response()
            }
            Self::StoreUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
