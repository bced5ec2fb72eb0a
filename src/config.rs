//! Configuration System
//!
//! Application settings for slack-status: logging, Slack endpoints and OAuth2 listener
//! defaults. These are separate from the credential store (see [`crate::store`]), which
//! only holds workspace tokens.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::{expand_home, DEFAULT_STORE_PATH};

pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://slack.com/oauth/v2/authorize";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:3030";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3030/redirect";
pub const DEFAULT_SCOPES: &str = "dnd:write,users.profile:write,users:write";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Root settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Slack Web API settings
    #[serde(default)]
    pub slack: SlackConfig,

    /// OAuth2 `init` defaults
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Slack Web API endpoints and transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Base URL for Web API methods (`<base>/users.setPresence`, ...)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth2 v2 authorization page
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_authorize_url() -> String {
    DEFAULT_AUTHORIZE_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            authorize_url: default_authorize_url(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl SlackConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.trim().is_empty() {
            return Err("api_base_url cannot be empty".to_string());
        }
        url::Url::parse(&self.api_base_url)
            .map_err(|e| format!("invalid api_base_url '{}': {}", self.api_base_url, e))?;
        if self.authorize_url.trim().is_empty() {
            return Err("authorize_url cannot be empty".to_string());
        }
        url::Url::parse(&self.authorize_url)
            .map_err(|e| format!("invalid authorize_url '{}': {}", self.authorize_url, e))?;
        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Defaults for the `init` command's OAuth2 flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Listener bind address; its port has to match `redirect_uri`
    #[serde(default = "default_http_bind")]
    pub http_bind: String,

    /// OAuth2 redirect_uri registered with the Slack app
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Comma separated user scopes
    #[serde(default = "default_scopes")]
    pub scopes: String,

    /// Seconds to wait for the redirect; 0 waits indefinitely
    #[serde(default = "default_auth_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_http_bind() -> String {
    DEFAULT_HTTP_BIND.to_string()
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_scopes() -> String {
    DEFAULT_SCOPES.to_string()
}

fn default_auth_timeout_secs() -> u64 {
    DEFAULT_AUTH_TIMEOUT_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            http_bind: default_http_bind(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            timeout_secs: default_auth_timeout_secs(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.http_bind.trim().is_empty() {
            return Err("http_bind cannot be empty".to_string());
        }
        url::Url::parse(&self.redirect_uri)
            .map_err(|e| format!("invalid redirect_uri '{}': {}", self.redirect_uri, e))?;
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Slack(String),
    Auth(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Slack(msg) => write!(f, "slack: {}", msg),
            ValidationError::Auth(msg) => write!(f, "auth: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.slack.validate() {
            errors.push(ValidationError::Slack(e));
        }
        if let Err(e) = self.auth.validate() {
            errors.push(ValidationError::Auth(e));
        }
        if self.logging.output == "file" && self.logging.file.is_none() {
            errors.push(ValidationError::Logging(
                "output 'file' requires a log file path".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
