//! Shared fixtures: an in-process identity provider and a cookie-keeping
//! browser that drives the router with `oneshot`.

#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::Cookie;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use oauth2::url::Url;
use report_portal_access::{
    AuthenticatedAccount, MemorySessionStore, OidcConfig, ResourceDescriptor, Session,
    SessionId, SessionStore, SessionStoreError, StaticResourceCatalog,
};
use report_portal_server::{
    app,
    auth::{AppState, IdentityClient},
    config::SessionConfig,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const CLIENT_ID: &str = "portal-client";
pub const CLIENT_SECRET: &str = "portal-secret";
pub const REDIRECT_URI: &str = "http://localhost:3000/redirect";
pub const TENANT: &str = "contoso";

/// How the mock token endpoint answers.
#[derive(Debug, Clone, Copy, Default)]
pub enum ProviderBehavior {
    #[default]
    Normal,
    OmitIdToken,
    Delay(Duration),
}

#[derive(Default)]
struct ProviderState {
    behavior: ProviderBehavior,
    codes: Mutex<HashMap<String, String>>,
    redeemed: AtomicU64,
}

/// Identity provider serving the token endpoint on a loopback port.
///
/// Codes are issued by the test (standing in for the sign-in page) and can
/// be redeemed once.
pub struct MockProvider {
    authority: String,
    state: Arc<ProviderState>,
    counter: AtomicU64,
}

impl MockProvider {
    pub async fn start() -> Self {
        Self::start_with(ProviderBehavior::Normal).await
    }

    pub async fn start_with(behavior: ProviderBehavior) -> Self {
        let state = Arc::new(ProviderState {
            behavior,
            ..ProviderState::default()
        });

        let router = Router::new()
            .route("/{tenant}/oauth2/v2.0/token", post(token))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock provider");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock provider");
        });

        Self {
            authority: format!("http://{addr}/{TENANT}"),
            state,
            counter: AtomicU64::new(0),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Issues a single-use code whose ID token carries `claims`.
    pub fn issue_code(&self, claims: Value) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let code = format!("code{n}");
        self.state
            .codes
            .lock()
            .expect("codes lock")
            .insert(code.clone(), id_token(&claims));
        code
    }

    /// Issues a code for a typical account signing in with `nonce`.
    pub fn issue_code_for(&self, nonce: &str) -> String {
        self.issue_code(json!({
            "sub": "subject-ada",
            "name": "Ada Lovelace",
            "preferred_username": "ada@contoso.com",
            "tid": "tenant-contoso",
            "nonce": nonce,
        }))
    }

    /// Number of codes successfully redeemed.
    pub fn redeemed(&self) -> u64 {
        self.state.redeemed.load(Ordering::SeqCst)
    }

    pub fn oidc_config(&self, exchange_timeout_seconds: u64) -> OidcConfig {
        OidcConfig::builder(
            CLIENT_ID.to_string(),
            CLIENT_SECRET.to_string(),
            REDIRECT_URI.to_string(),
        )
        .authority(self.authority.clone())
        .exchange_timeout_seconds(exchange_timeout_seconds)
        .build()
    }

    pub fn identity_client(&self) -> IdentityClient {
        IdentityClient::new(&self.oidc_config(5)).expect("identity client")
    }
}

/// Builds an unsigned compact JWT.
pub fn id_token(claims: &Value) -> String {
    format!(
        "{}.{}.unsigned",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

async fn token(
    State(state): State<Arc<ProviderState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if let ProviderBehavior::Delay(delay) = state.behavior {
        tokio::time::sleep(delay).await;
    }

    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();

    if field("client_id") != CLIENT_ID || field("client_secret") != CLIENT_SECRET {
        return token_error(StatusCode::UNAUTHORIZED, "invalid_client");
    }
    if field("grant_type") != "authorization_code"
        || field("redirect_uri") != REDIRECT_URI
        || field("code_verifier").is_empty()
    {
        return token_error(StatusCode::BAD_REQUEST, "invalid_request");
    }

    let Some(id_token) = state
        .codes
        .lock()
        .expect("codes lock")
        .remove(field("code"))
    else {
        return token_error(StatusCode::BAD_REQUEST, "invalid_grant");
    };
    state.redeemed.fetch_add(1, Ordering::SeqCst);

    let mut body = json!({
        "access_token": "access-token",
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": field("scope"),
    });
    if !matches!(state.behavior, ProviderBehavior::OmitIdToken) {
        body["id_token"] = Value::String(id_token);
    }
    Json(body).into_response()
}

fn token_error(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "error_description": format!("mock provider: {error}"),
        })),
    )
        .into_response()
}

pub fn descriptor(display_name: &str, resource_id: &str) -> ResourceDescriptor {
    ResourceDescriptor {
        display_name: display_name.to_string(),
        resource_id: resource_id.to_string(),
        workspace_id: "workspace-1".to_string(),
        embed_url: String::new(),
    }
}

/// A session store whose backend is down: reads and writes fail.
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> report_portal_core::Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable {
            details: "connection refused".to_string(),
        }
        .into())
    }
}

#[async_trait::async_trait]
impl SessionStore for UnavailableStore {
    async fn load(
        &self,
        _id: &SessionId,
    ) -> report_portal_core::Result<Option<Session>, SessionStoreError> {
        Self::error().map(|()| None)
    }

    async fn set_authenticated_account(
        &self,
        _id: &SessionId,
        _account: AuthenticatedAccount,
    ) -> report_portal_core::Result<(), SessionStoreError> {
        Self::error()
    }

    async fn touch(&self, _id: &SessionId) -> report_portal_core::Result<(), SessionStoreError> {
        Self::error()
    }

    async fn destroy(&self, _id: &SessionId) -> report_portal_core::Result<(), SessionStoreError> {
        Self::error()
    }

    async fn purge_expired(&self) -> report_portal_core::Result<u64, SessionStoreError> {
        Self::error().map(|()| 0)
    }
}

/// A portal wired to `provider` with an in-memory store.
pub struct Portal {
    pub router: Router,
    pub store: Arc<MemorySessionStore>,
}

impl Portal {
    pub fn new(provider: &MockProvider) -> Self {
        let store = Arc::new(MemorySessionStore::new(None));
        Self {
            router: portal_router(provider, store.clone()),
            store,
        }
    }
}

/// Builds the portal router over an arbitrary session store.
pub fn portal_router(provider: &MockProvider, store: Arc<dyn SessionStore>) -> Router {
    let mut reports = BTreeMap::new();
    reports.insert(
        "management".to_string(),
        descriptor("Management dashboard", "mgmt-report"),
    );
    reports.insert(
        "operations".to_string(),
        descriptor("Operations dashboard", "ops-report"),
    );
    reports.insert(
        "finance".to_string(),
        descriptor("Finance dashboard", "fin-report"),
    );

    let session_config = SessionConfig {
        secure_cookies: false,
        ..SessionConfig::default()
    };
    let state = Arc::new(AppState::new(
        provider.identity_client(),
        store,
        Arc::new(StaticResourceCatalog::new(reports)),
        session_config,
    ));

    app::router(state, "tests/no-static-assets")
}

/// A response with its body read.
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl Page {
    /// Query parameters of the `Location` header, resolved against the portal origin.
    pub fn location_query(&self) -> HashMap<String, String> {
        let location = self.location.as_deref().expect("location header");
        Url::parse("http://localhost:3000")
            .and_then(|base| base.join(location))
            .expect("location url")
            .query_pairs()
            .into_owned()
            .collect()
    }
}

/// Keeps cookies between requests the way a browser would.
#[derive(Default)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, router: &Router, uri: &str) -> Page {
        self.send(router, Method::GET, uri).await
    }

    pub async fn send(&mut self, router: &Router, method: Method, uri: &str) -> Page {
        let mut request = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            request = request.header(header::COOKIE, header);
        }
        let request = request.body(Body::empty()).expect("request");

        let response = router.clone().oneshot(request).await.expect("response");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        for raw in &set_cookies {
            let cookie = Cookie::parse(raw.clone()).expect("set-cookie");
            if cookie.max_age().is_some_and(|age| age.is_zero()) {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        Page {
            status,
            location,
            set_cookies,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Runs `/login` and returns the `state` and `nonce` sent to the provider.
    pub async fn start_login(&mut self, router: &Router) -> (String, String) {
        let page = self.get(router, "/login").await;
        assert_eq!(page.status, StatusCode::SEE_OTHER);
        let query = page.location_query();
        (query["state"].clone(), query["nonce"].clone())
    }

    /// Completes a full sign-in and returns the callback response.
    pub async fn sign_in(&mut self, portal: &Portal, provider: &MockProvider) -> Page {
        let (state, nonce) = self.start_login(&portal.router).await;
        let code = provider.issue_code_for(&nonce);
        self.get(&portal.router, &format!("/redirect?code={code}&state={state}"))
            .await
    }
}
