//! OAuth2 authorization flow for linking a workspace.
//!
//! Builds the Slack authorization URL, waits for the browser redirect on a local
//! listener and exchanges the temporary code for a user token.

pub mod callback;

pub use callback::{CallbackServer, CONFIRMATION_BODY};

use crate::error::ApiError;
use crate::provider::{OAuthGrant, TokenExchange};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Token class the status calls need; bot or workspace tokens are rejected.
pub const USER_TOKEN_TYPE: &str = "user";

/// Inputs for one authorization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Comma separated user scopes
    pub scopes: String,
    /// Listener bind address; its port has to match `redirect_uri`
    pub http_bind: String,
    /// `None` waits for the redirect indefinitely
    pub timeout: Option<Duration>,
}

/// What the operator needs to complete the grant in a browser
#[derive(Debug, Clone)]
pub struct AuthorizationPrompt {
    pub url: Url,
    pub listening_on: SocketAddr,
}

/// Result of a successful authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedUser {
    pub user_id: String,
    pub access_token: String,
    pub team: Option<String>,
}

/// Authorization page URL with `user_scope`, `client_id` and `redirect_uri` query-encoded.
pub fn authorization_url(
    authorize_url: &str,
    client_id: &str,
    scopes: &str,
    redirect_uri: &str,
) -> Result<Url, ApiError> {
    Url::parse_with_params(
        authorize_url,
        &[
            ("user_scope", scopes),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
        ],
    )
    .map_err(|e| ApiError::ConfigError(format!("Invalid authorize URL '{}': {}", authorize_url, e)))
}

/// Route the listener serves: the path component of the redirect URI.
pub fn redirect_path(redirect_uri: &str) -> Result<String, ApiError> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid redirect URI '{}': {}", redirect_uri, e)))?;
    let path = url.path();
    if path.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(path.to_string())
    }
}

/// Check the exchange response and pull out the user token.
pub fn validate_grant(grant: Option<OAuthGrant>) -> Result<AuthorizedUser, ApiError> {
    let grant = grant.ok_or_else(|| ApiError::AuthorizationFailed("response is empty".to_string()))?;
    let team = grant.team.map(|t| t.name).filter(|n| !n.is_empty());
    let user = grant.authed_user.ok_or_else(|| {
        ApiError::AuthorizationFailed("response does not contain user auth token".to_string())
    })?;

    if user.token_type != USER_TOKEN_TYPE {
        return Err(ApiError::AuthorizationFailed(format!(
            "response does not contain user auth token (token type '{}')",
            user.token_type
        )));
    }
    if user.access_token.is_empty() {
        return Err(ApiError::AuthorizationFailed(
            "response contains an empty access token".to_string(),
        ));
    }

    Ok(AuthorizedUser {
        user_id: user.id,
        access_token: user.access_token,
        team,
    })
}

/// Drives one authorization run against a token exchange backend
pub struct Authorizer<'a> {
    exchange: &'a dyn TokenExchange,
    authorize_url: String,
}

impl<'a> Authorizer<'a> {
    pub fn new(exchange: &'a dyn TokenExchange, authorize_url: impl Into<String>) -> Self {
        Self {
            exchange,
            authorize_url: authorize_url.into(),
        }
    }

    /// Run the flow. `present` is called once the listener is up; `cancel` aborts the wait.
    pub async fn authorize<F, C>(
        &self,
        request: &AuthorizationRequest,
        present: F,
        cancel: C,
    ) -> Result<AuthorizedUser, ApiError>
    where
        F: FnOnce(&AuthorizationPrompt),
        C: Future<Output = ()>,
    {
        let url = authorization_url(
            &self.authorize_url,
            &request.client_id,
            &request.scopes,
            &request.redirect_uri,
        )?;
        let path = redirect_path(&request.redirect_uri)?;

        let server = CallbackServer::bind(&request.http_bind, &path).await?;
        present(&AuthorizationPrompt {
            url,
            listening_on: server.local_addr(),
        });

        let code = server.wait_for_code(request.timeout, cancel).await?;
        info!("Got temporary authorization code, shut down redirect listener");

        let grant = self
            .exchange
            .exchange_code(
                &request.client_id,
                &request.client_secret,
                &code,
                &request.redirect_uri,
            )
            .await
            .map_err(|e| {
                ApiError::AuthorizationFailed(format!(
                    "failed to convert temporary authorization code for authorization code: {}",
                    e
                ))
            })?;

        validate_grant(grant)
    }
}
