//! Identity provider configuration.
//!
//! This module provides the settings needed to run the OAuth2/OIDC
//! authorization-code flow against an external identity provider. The
//! defaults target Microsoft Entra ID, whose endpoints live under
//! `{authority}/oauth2/v2.0/`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProviderConfigurationError;

/// Host used when no explicit authority is configured.
const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tenant used when neither an authority nor a tenant is configured.
const DEFAULT_TENANT: &str = "common";

/// Configuration for the OIDC identity provider.
///
/// Every field has a serde default so that absent settings surface as
/// [`ProviderConfigurationError`] from [`OidcConfig::validate`] rather than
/// as an opaque deserialization failure.
#[derive(Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// The OAuth2 client ID registered with the provider.
    #[serde(default)]
    client_id: String,
    /// The OAuth2 client secret.
    #[serde(default)]
    client_secret: String,
    /// Directory tenant used to derive the default authority.
    #[serde(default)]
    tenant_id: Option<String>,
    /// Full authority URL (e.g. "https://login.microsoftonline.com/contoso").
    /// Overrides `tenant_id` when set.
    #[serde(default)]
    authority: Option<String>,
    /// The redirect URI registered for the callback (e.g. "https://app.example.com/redirect").
    #[serde(default)]
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "User.Read"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Upper bound on the token exchange round trip, in seconds.
    #[serde(default = "default_exchange_timeout_seconds")]
    exchange_timeout_seconds: u64,
}

fn default_scopes() -> String {
    "User.Read".to_string()
}

fn default_exchange_timeout_seconds() -> u64 {
    30
}

impl OidcConfig {
    /// Creates a new OIDC configuration with defaults for optional fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            tenant_id: None,
            authority: None,
            redirect_uri,
            scopes: default_scopes(),
            exchange_timeout_seconds: default_exchange_timeout_seconds(),
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> OidcConfigBuilder {
        OidcConfigBuilder::new(client_id, client_secret, redirect_uri)
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the configured tenant, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Returns the authority URL without a trailing slash.
    #[must_use]
    pub fn authority(&self) -> String {
        match self.authority.as_deref().map(str::trim) {
            Some(authority) if !authority.is_empty() => authority.trim_end_matches('/').to_string(),
            _ => {
                let tenant = self
                    .tenant_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(DEFAULT_TENANT);
                format!("{DEFAULT_AUTHORITY_HOST}/{tenant}")
            }
        }
    }

    /// Returns the provider's authorization endpoint.
    #[must_use]
    pub fn authorize_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/authorize", self.authority())
    }

    /// Returns the provider's token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority())
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the token exchange timeout in seconds.
    #[must_use]
    pub fn exchange_timeout_seconds(&self) -> u64 {
        self.exchange_timeout_seconds
    }

    /// Checks that every required setting is present.
    ///
    /// URL syntax is checked by the identity client when it is built.
    ///
    /// # Errors
    ///
    /// Returns `MissingSetting` for the first absent required setting, or
    /// `InvalidSetting` for a zero exchange timeout.
    pub fn validate(&self) -> report_portal_core::Result<(), ProviderConfigurationError> {
        let required = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        for (setting, value) in required {
            if value.trim().is_empty() {
                return Err(ProviderConfigurationError::MissingSetting { setting }.into());
            }
        }

        if self.scopes().is_empty() {
            return Err(ProviderConfigurationError::MissingSetting { setting: "scopes" }.into());
        }

        if self.exchange_timeout_seconds == 0 {
            return Err(ProviderConfigurationError::InvalidSetting {
                setting: "exchange_timeout_seconds",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self::new(String::new(), String::new(), String::new())
    }
}

impl fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("authority", &self.authority)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("exchange_timeout_seconds", &self.exchange_timeout_seconds)
            .finish()
    }
}

/// Builder for `OidcConfig`.
#[derive(Debug)]
pub struct OidcConfigBuilder {
    config: OidcConfig,
    scopes: Vec<String>,
}

impl OidcConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            config: OidcConfig::new(client_id, client_secret, redirect_uri),
            scopes: vec![default_scopes()],
        }
    }

    /// Sets the directory tenant.
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: String) -> Self {
        self.config.tenant_id = Some(tenant_id);
        self
    }

    /// Sets an explicit authority URL.
    #[must_use]
    pub fn authority(mut self, authority: String) -> Self {
        self.config.authority = Some(authority);
        self
    }

    /// Sets the OAuth2 scopes to request.
    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Adds a scope to the list of scopes to request.
    #[must_use]
    pub fn add_scope(mut self, scope: String) -> Self {
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
        self
    }

    /// Sets the token exchange timeout.
    #[must_use]
    pub fn exchange_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.exchange_timeout_seconds = seconds;
        self
    }

    /// Builds the `OidcConfig`.
    #[must_use]
    pub fn build(mut self) -> OidcConfig {
        self.config.scopes = self.scopes.join(",");
        self.config
    }
}
