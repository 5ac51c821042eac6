//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! `__` as separator, e.g. `OIDC__CLIENT_ID` or `REPORTS__FINANCE__EMBED_URL`.
//!
//! See [`OidcConfig`](report_portal_access::OidcConfig) for identity
//! provider configuration.

use chrono::Duration;
use report_portal_access::{OidcConfig, ResourceDescriptor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Dashboards registered out of the box, keyed by group.
const DEFAULT_REPORTS: &[(&str, &str)] = &[
    ("finance", "Finance dashboard"),
    ("management", "Management dashboard"),
    ("operations", "Operations dashboard"),
];

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Identity provider configuration.
    #[serde(default)]
    pub oidc: OidcConfig,

    /// Dashboards addressable under `/group/{key}`.
    #[serde(default)]
    pub reports: BTreeMap<String, ResourceDescriptor>,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is discarded, in minutes.
    /// Zero or negative disables idle expiry.
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_idle_timeout_minutes() -> i64 {
    480
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl SessionConfig {
    /// Returns the idle timeout, or `None` when idle expiry is disabled.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_minutes > 0).then(|| Duration::minutes(self.idle_timeout_minutes))
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is present but cannot be parsed.
    /// Identity provider settings are validated separately when the
    /// identity client is built.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        for (key, display_name) in DEFAULT_REPORTS {
            builder = builder.set_default(format!("reports.{key}.display_name"), *display_name)?;
        }

        builder
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
