//! Cookies carried across the login round trip.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use report_portal_access::SessionId;
use time::Duration;

use super::oidc::AuthorizationRequestState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (CSRF, PKCE and nonce for one login attempt).
pub const AUTH_STATE_COOKIE: &str = "auth_state";

/// Path requested before the browser was sent to log in.
pub const RETURN_TO_COOKIE: &str = "return_to";

/// Lifetime of the cookies that only span the provider round trip.
const LOGIN_ROUND_TRIP: Duration = Duration::minutes(10);

fn short_lived(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(LOGIN_ROUND_TRIP)
        .build()
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").max_age(Duration::ZERO).build()
}

/// Creates the session cookie. It lives for the browser session; idle
/// expiry is enforced by the store.
pub fn session_cookie(session_id: &SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Creates a removal cookie for the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    removal(SESSION_COOKIE)
}

/// Reads the session identifier from the jar.
pub fn session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|value| !value.is_empty())
        .map(SessionId::from)
}

/// Creates the auth state cookie. The JSON state is base64url encoded so it
/// only contains cookie-safe characters.
pub fn auth_state_cookie(
    state: &AuthorizationRequestState,
    secure: bool,
) -> serde_json::Result<Cookie<'static>> {
    let json = serde_json::to_vec(state)?;
    Ok(short_lived(AUTH_STATE_COOKIE, URL_SAFE_NO_PAD.encode(json), secure))
}

/// Creates a removal cookie for the auth state.
pub fn clear_auth_state_cookie() -> Cookie<'static> {
    removal(AUTH_STATE_COOKIE)
}

/// Outcome of reading the auth state cookie.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthStateCookie {
    Missing,
    Invalid,
    Present(AuthorizationRequestState),
}

/// Reads and decodes the auth state cookie.
pub fn auth_state(jar: &CookieJar) -> AuthStateCookie {
    let Some(cookie) = jar.get(AUTH_STATE_COOKIE) else {
        return AuthStateCookie::Missing;
    };

    URL_SAFE_NO_PAD
        .decode(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .map_or(AuthStateCookie::Invalid, AuthStateCookie::Present)
}

/// Creates the cookie remembering where to go after login.
pub fn return_to_cookie(path: &str, secure: bool) -> Cookie<'static> {
    short_lived(RETURN_TO_COOKIE, path.to_string(), secure)
}

/// Creates a removal cookie for the return path.
pub fn clear_return_to_cookie() -> Cookie<'static> {
    removal(RETURN_TO_COOKIE)
}

/// Reads the remembered return path, if it is a local path.
pub fn return_to(jar: &CookieJar) -> Option<String> {
    jar.get(RETURN_TO_COOKIE)
        .map(Cookie::value)
        .and_then(local_path)
        .map(str::to_string)
}

/// Accepts only same-origin absolute paths such as `/group/finance`.
///
/// Rejects protocol-relative (`//host`) and backslash (`/\host`) forms that
/// browsers resolve to another origin.
pub fn local_path(path: &str) -> Option<&str> {
    let is_local = path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control);
    is_local.then_some(path)
}
