//! Slack Web API Provider
//!
//! The remote chat service as seen by slack-status: four per-workspace calls used by the
//! status engine and the OAuth2 code exchange used by `init`. Both are traits so the
//! engine and the authorization flow can be driven by in-memory doubles.

use crate::config::SlackConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Presence value accepted by `users.setPresence`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Auto,
    Away,
}

impl Presence {
    pub fn from_away(away: bool) -> Self {
        if away {
            Presence::Away
        } else {
            Presence::Auto
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Auto => "auto",
            Presence::Away => "away",
        }
    }
}

/// Custom status payload for `users.profile.set`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomStatus {
    pub status_text: String,
    pub status_emoji: String,
    /// Absolute unix time in seconds; 0 means the status never expires
    pub status_expiration: i64,
}

/// `authed_user` block of an `oauth.v2.access` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthedUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Successful `oauth.v2.access` response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OAuthGrant {
    #[serde(default)]
    pub authed_user: Option<AuthedUser>,
    #[serde(default)]
    pub team: Option<TeamRef>,
}

/// Per-workspace calls. Every call is authenticated with that workspace's user token.
#[async_trait]
pub trait StatusApi: Send + Sync {
    async fn set_presence(&self, token: &str, presence: Presence) -> Result<(), ApiError>;

    async fn set_custom_status(&self, token: &str, status: &CustomStatus) -> Result<(), ApiError>;

    /// Snooze notifications for `minutes`; 0 clears an active snooze.
    async fn set_snooze(&self, token: &str, minutes: u32) -> Result<(), ApiError>;

    async fn set_photo(&self, token: &str, image: &Path) -> Result<(), ApiError>;
}

/// OAuth2 authorization-code exchange
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Trade a temporary code for tokens. `Ok(None)` means the provider answered with an
    /// empty body.
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<OAuthGrant>, ApiError>;
}

/// Envelope every Web API method answers with
#[derive(Debug, Deserialize)]
struct SlackEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

// Helper function to map transport errors to ApiError
fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        match status.as_u16() {
            401 | 403 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", error)),
            429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", error)),
            _ => ApiError::ProviderRequestFailed(format!(
                "Request failed with status {}: {}",
                status, error
            )),
        }
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

// Slack reports most failures as HTTP 200 with ok=false
fn map_slack_error(method: &str, error: Option<String>) -> ApiError {
    let code = error.unwrap_or_else(|| "unknown_error".to_string());
    match code.as_str() {
        "not_authed" | "invalid_auth" | "account_inactive" | "token_revoked"
        | "token_expired" | "missing_scope" | "no_permission" => {
            ApiError::ProviderAuthFailed(format!("{}: {}", method, code))
        }
        "ratelimited" => ApiError::ProviderRateLimit(format!("{}: {}", method, code)),
        _ => ApiError::ProviderRequestFailed(format!("{}: {}", method, code)),
    }
}

const SLACK_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn build_slack_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(SLACK_HTTP_CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// reqwest-backed Slack Web API client
pub struct SlackClient {
    client: Client,
    api_base_url: String,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self, ApiError> {
        let client = build_slack_http_client(config.http_timeout())?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base_url, method)
    }

    /// Send a request and return the raw body after checking the HTTP status.
    async fn send(&self, method: &str, request: RequestBuilder) -> Result<String, ApiError> {
        tracing::debug!(method, "Calling Slack Web API");
        let response = request.send().await.map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => ApiError::ProviderAuthFailed(format!("{}: {}", method, error_text)),
                429 => ApiError::ProviderRateLimit(format!("{}: {}", method, error_text)),
                _ => ApiError::ProviderRequestFailed(format!(
                    "{} returned {}: {}",
                    method, status, error_text
                )),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to read {} response: {}", method, e)))
    }

    /// Parse a body into `T` after checking the `ok` envelope.
    fn parse_checked<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, ApiError> {
        let envelope: SlackEnvelope = serde_json::from_str(body).map_err(|e| {
            ApiError::ProviderError(format!("Failed to parse {} response: {}", method, e))
        })?;
        if !envelope.ok {
            return Err(map_slack_error(method, envelope.error));
        }
        serde_json::from_str(body).map_err(|e| {
            ApiError::ProviderError(format!("Failed to parse {} response: {}", method, e))
        })
    }

    async fn call_ack(&self, method: &str, request: RequestBuilder) -> Result<(), ApiError> {
        let body = self.send(method, request).await?;
        Self::parse_checked::<serde_json::Value>(method, &body).map(|_| ())
    }
}

#[async_trait]
impl StatusApi for SlackClient {
    async fn set_presence(&self, token: &str, presence: Presence) -> Result<(), ApiError> {
        let method = "users.setPresence";
        let request = self
            .client
            .post(self.method_url(method))
            .bearer_auth(token)
            .form(&[("presence", presence.as_str())]);
        self.call_ack(method, request).await
    }

    async fn set_custom_status(&self, token: &str, status: &CustomStatus) -> Result<(), ApiError> {
        let method = "users.profile.set";
        let request = self
            .client
            .post(self.method_url(method))
            .bearer_auth(token)
            .json(&json!({ "profile": status }));
        self.call_ack(method, request).await
    }

    async fn set_snooze(&self, token: &str, minutes: u32) -> Result<(), ApiError> {
        let method = "dnd.setSnooze";
        let num_minutes = minutes.to_string();
        let request = self
            .client
            .post(self.method_url(method))
            .bearer_auth(token)
            .form(&[("num_minutes", num_minutes.as_str())]);
        self.call_ack(method, request).await
    }

    async fn set_photo(&self, token: &str, image: &Path) -> Result<(), ApiError> {
        let method = "users.setPhoto";
        let bytes = tokio::fs::read(image).await.map_err(|e| {
            ApiError::InvalidInput(format!(
                "Failed to read profile picture {}: {}",
                image.display(),
                e
            ))
        })?;
        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime_type(image))
            .map_err(|e| ApiError::ProviderError(format!("Invalid image mime type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let request = self
            .client
            .post(self.method_url(method))
            .bearer_auth(token)
            .multipart(form);
        self.call_ack(method, request).await
    }
}

#[async_trait]
impl TokenExchange for SlackClient {
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<OAuthGrant>, ApiError> {
        let method = "oauth.v2.access";
        let request = self.client.post(self.method_url(method)).form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ]);

        let body = self.send(method, request).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Self::parse_checked(method, &body).map(Some)
    }
}

fn image_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
