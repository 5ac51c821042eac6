//! Identity provider client built on the oauth2 crate.
//!
//! Endpoints are derived from the configured authority rather than
//! discovered, so building an authorization URL never touches the network.

use base64::Engine;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, ExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl,
    RequestTokenError, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use report_portal_access::{
    AuthenticatedAccount, OidcConfig, ProviderConfigurationError, TokenExchangeError,
};
use report_portal_core::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use tracing::debug;

/// Scopes always requested so the provider returns an ID token.
const IDENTITY_SCOPES: &[&str] = &["openid", "profile"];

/// Extra token response fields carrying the OIDC ID token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

/// Token response with an optional ID token.
type IdTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

/// OAuth2 client with authorization and token endpoints set.
type ProviderClient = Client<
    BasicErrorResponse,
    IdTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Claims read from the ID token payload.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    tid: Option<String>,
    #[serde(default)]
    nonce: Option<String>,
}

/// Data needed to complete one login attempt at the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequestState {
    pub csrf_token: String,
    pub pkce_verifier: String,
    pub nonce: String,
    /// Local path to return to once signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
}

impl AuthorizationRequestState {
    /// Records where the browser should land after login.
    #[must_use]
    pub fn with_return_to(mut self, return_to: Option<String>) -> Self {
        self.return_to = return_to;
        self
    }
}

/// Client for the provider's authorization-code flow.
///
/// Holds no per-login state; everything a callback needs travels in
/// [`AuthorizationRequestState`].
#[derive(Clone)]
pub struct IdentityClient {
    client: ProviderClient,
    http_client: reqwest::Client,
    exchange_timeout: Duration,
    config: OidcConfig,
}

impl IdentityClient {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderConfigurationError` if a required setting is missing,
    /// if the authority or redirect URI is not a valid URL, or if the HTTP
    /// client cannot be constructed.
    pub fn new(config: &OidcConfig) -> Result<Self, ProviderConfigurationError> {
        config.validate()?;

        let auth_url = AuthUrl::new(config.authorize_endpoint()).map_err(|e| {
            ProviderConfigurationError::InvalidSetting {
                setting: "authority",
                reason: e.to_string(),
            }
        })?;
        let token_url = TokenUrl::new(config.token_endpoint()).map_err(|e| {
            ProviderConfigurationError::InvalidSetting {
                setting: "authority",
                reason: e.to_string(),
            }
        })?;
        let redirect_url = parse_redirect_uri(config.redirect_uri())?;

        let client = Client::new(ClientId::new(config.client_id().to_string()))
            .set_client_secret(ClientSecret::new(config.client_secret().to_string()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url)
            .set_auth_type(AuthType::RequestBody);

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProviderConfigurationError::InvalidSetting {
                setting: "http_client",
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            http_client,
            exchange_timeout: Duration::from_secs(config.exchange_timeout_seconds()),
            config: config.clone(),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Builds the URL that sends the browser to the provider.
    ///
    /// Returns the URL along with the state to keep until the callback.
    ///
    /// # Errors
    ///
    /// Returns `ProviderConfigurationError` if `redirect_uri` is not a valid URL.
    pub fn authorization_url(
        &self,
        scopes: &[&str],
        redirect_uri: &str,
    ) -> Result<(String, AuthorizationRequestState), ProviderConfigurationError> {
        let redirect_url = parse_redirect_uri(redirect_uri)?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let nonce = CsrfToken::new_random();

        let mut auth_request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(Cow::Owned(redirect_url))
            .set_pkce_challenge(pkce_challenge)
            .add_extra_param("nonce", nonce.secret().clone());

        for scope in request_scopes(scopes) {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = AuthorizationRequestState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
            nonce: nonce.secret().clone(),
            return_to: None,
        };

        Ok((auth_url.to_string(), state))
    }

    /// Exchanges an authorization code for the signed-in account.
    ///
    /// The ID token arrives over the back channel from the token endpoint,
    /// so its payload is read without re-validating the signature. The nonce
    /// must still match the one issued for this login attempt.
    ///
    /// # Errors
    ///
    /// Returns `TokenExchangeError` if the provider cannot be reached in time,
    /// rejects the code, or answers without a usable ID token.
    pub async fn exchange_code(
        &self,
        code: &str,
        scopes: &[&str],
        redirect_uri: &str,
        state: &AuthorizationRequestState,
    ) -> Result<AuthenticatedAccount, TokenExchangeError> {
        let redirect_url =
            RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
                TokenExchangeError::InvalidRequest {
                    details: format!("invalid redirect URI: {e}"),
                }
            })?;
        let scope = request_scopes(scopes).join(" ");

        let request = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(Cow::Owned(redirect_url))
            .set_pkce_verifier(PkceCodeVerifier::new(state.pkce_verifier.clone()))
            .add_extra_param("scope", scope);

        let token_response = tokio::time::timeout(
            self.exchange_timeout,
            request.request_async(&self.http_client),
        )
        .await
        .map_err(|_| TokenExchangeError::Timeout {
            seconds: self.exchange_timeout.as_secs(),
        })?
        .map_err(classify_request_error)?;

        let id_token = token_response
            .extra_fields()
            .id_token
            .as_deref()
            .ok_or(TokenExchangeError::MissingIdToken)?;

        let claims = decode_id_token_claims(id_token)?;
        if claims.nonce.as_deref() != Some(state.nonce.as_str()) {
            return Err(TokenExchangeError::NonceMismatch.into());
        }

        debug!(subject = %claims.sub, "token exchange succeeded");
        Ok(account_from_claims(claims))
    }
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("config", &self.config)
            .field("exchange_timeout", &self.exchange_timeout)
            .finish_non_exhaustive()
    }
}

fn parse_redirect_uri(redirect_uri: &str) -> Result<RedirectUrl, ProviderConfigurationError> {
    RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
        ProviderConfigurationError::InvalidSetting {
            setting: "redirect_uri",
            reason: e.to_string(),
        }
        .into()
    })
}

/// Appends the identity scopes to the configured ones, keeping order and
/// dropping duplicates.
fn request_scopes<'a>(scopes: &[&'a str]) -> Vec<&'a str> {
    let mut requested: Vec<&'a str> = Vec::with_capacity(scopes.len() + IDENTITY_SCOPES.len());
    for scope in scopes.iter().copied().chain(IDENTITY_SCOPES.iter().copied()) {
        if !requested.contains(&scope) {
            requested.push(scope);
        }
    }
    requested
}

fn classify_request_error<RE>(
    err: RequestTokenError<RE, BasicErrorResponse>,
) -> TokenExchangeError
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => TokenExchangeError::Rejected {
            error: response.error().to_string(),
            description: response.error_description().cloned(),
        },
        RequestTokenError::Request(e) => TokenExchangeError::Transport {
            details: e.to_string(),
        },
        RequestTokenError::Parse(e, _) => TokenExchangeError::MalformedResponse {
            details: e.to_string(),
        },
        RequestTokenError::Other(details) => TokenExchangeError::MalformedResponse { details },
    }
}

/// Reads the claims from a compact JWT's payload segment.
fn decode_id_token_claims(id_token: &str) -> Result<IdTokenClaims, TokenExchangeError> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenExchangeError::MalformedIdToken {
            details: "expected three segments".to_string(),
        }
        .into());
    }

    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| TokenExchangeError::MalformedIdToken {
            details: format!("payload is not base64url: {e}"),
        })?;

    let claims = serde_json::from_slice::<IdTokenClaims>(&payload).map_err(|e| {
        TokenExchangeError::MalformedIdToken {
            details: format!("payload is not a claims object: {e}"),
        }
    })?;
    Ok(claims)
}

fn account_from_claims(claims: IdTokenClaims) -> AuthenticatedAccount {
    let display_name = claims
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| claims.preferred_username.clone())
        .unwrap_or_else(|| claims.sub.clone());

    AuthenticatedAccount::new(claims.sub, display_name)
        .with_tenant_id(claims.tid)
        .with_username(claims.preferred_username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2::url::Url;
    use std::collections::HashMap;

    fn config() -> OidcConfig {
        OidcConfig::builder(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:3000/redirect".to_string(),
        )
        .tenant_id("contoso".to_string())
        .build()
    }

    fn query(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .expect("absolute url")
            .query_pairs()
            .into_owned()
            .collect()
    }

    fn jwt(claims: &serde_json::Value) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.sig",
            engine.encode(br#"{"alg":"none","typ":"JWT"}"#),
            engine.encode(claims.to_string())
        )
    }

    #[test]
    fn new_rejects_missing_client_id() {
        let config = OidcConfig::new(
            String::new(),
            "client-secret".to_string(),
            "http://localhost:3000/redirect".to_string(),
        );
        let err = IdentityClient::new(&config).expect_err("client id required");
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn new_rejects_malformed_authority() {
        let config = OidcConfig::builder(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:3000/redirect".to_string(),
        )
        .authority("not a url".to_string())
        .build();
        let err = IdentityClient::new(&config).expect_err("authority must be a URL");
        assert!(err.to_string().contains("authority"));
    }

    #[test]
    fn new_rejects_malformed_redirect_uri() {
        let config = OidcConfig::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "/redirect".to_string(),
        );
        let err = IdentityClient::new(&config).expect_err("redirect must be absolute");
        assert!(err.to_string().contains("redirect_uri"));
    }

    #[test]
    fn authorization_url_carries_flow_parameters() {
        let client = IdentityClient::new(&config()).expect("client");
        let (url, state) = client
            .authorization_url(&["User.Read"], "http://localhost:3000/redirect")
            .expect("url");

        assert!(url.starts_with(
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/authorize?"
        ));

        let params = query(&url);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/redirect");
        assert_eq!(params["scope"], "User.Read openid profile");
        assert_eq!(params["state"], state.csrf_token);
        assert_eq!(params["nonce"], state.nonce);
        assert_eq!(params["code_challenge_method"], "S256");
        assert!(!params["code_challenge"].is_empty());
        assert!(state.return_to.is_none());
    }

    #[test]
    fn authorization_url_state_is_fresh_per_call() {
        let client = IdentityClient::new(&config()).expect("client");
        let (_, first) = client
            .authorization_url(&["User.Read"], "http://localhost:3000/redirect")
            .expect("url");
        let (_, second) = client
            .authorization_url(&["User.Read"], "http://localhost:3000/redirect")
            .expect("url");

        assert_ne!(first.csrf_token, second.csrf_token);
        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.pkce_verifier, second.pkce_verifier);
    }

    #[test]
    fn authorization_url_rejects_malformed_redirect_uri() {
        let client = IdentityClient::new(&config()).expect("client");
        let err = client
            .authorization_url(&["User.Read"], "::not-a-url")
            .expect_err("malformed redirect");
        assert!(err.to_string().contains("redirect_uri"));
    }

    #[test]
    fn request_scopes_appends_identity_scopes_once() {
        assert_eq!(
            request_scopes(&["User.Read"]),
            vec!["User.Read", "openid", "profile"]
        );
        assert_eq!(
            request_scopes(&["openid", "User.Read", "User.Read"]),
            vec!["openid", "User.Read", "profile"]
        );
    }

    #[test]
    fn claims_decode_from_payload() {
        let token = jwt(&serde_json::json!({
            "sub": "subject-1",
            "name": "Ada Lovelace",
            "preferred_username": "ada@contoso.com",
            "tid": "tenant-1",
            "nonce": "n-1"
        }));

        let claims = decode_id_token_claims(&token).expect("claims");
        assert_eq!(claims.nonce.as_deref(), Some("n-1"));

        let account = account_from_claims(claims);
        assert_eq!(account.subject, "subject-1");
        assert_eq!(account.display_name, "Ada Lovelace");
        assert_eq!(account.tenant_id.as_deref(), Some("tenant-1"));
        assert_eq!(account.username.as_deref(), Some("ada@contoso.com"));
    }

    #[test]
    fn display_name_falls_back_to_username_then_subject() {
        let claims = decode_id_token_claims(&jwt(&serde_json::json!({
            "sub": "subject-1",
            "preferred_username": "ada@contoso.com"
        })))
        .expect("claims");
        assert_eq!(account_from_claims(claims).display_name, "ada@contoso.com");

        let claims =
            decode_id_token_claims(&jwt(&serde_json::json!({ "sub": "subject-1" }))).expect("claims");
        assert_eq!(account_from_claims(claims).display_name, "subject-1");
    }

    #[test]
    fn malformed_id_tokens_are_rejected() {
        assert!(decode_id_token_claims("only.two").is_err());
        assert!(decode_id_token_claims("a.!!!.c").is_err());

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let not_json = format!("h.{}.s", engine.encode("not json"));
        let err = decode_id_token_claims(&not_json).expect_err("payload must be JSON");
        assert!(err.to_string().contains("claims"));
    }
}
