//! Error types for slack-status.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credential store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize credential store: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to save credential store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential store failed validation: access token is required (workspace #{index} '{name}')")]
    MissingAccessToken { index: usize, name: String },

    #[error("Unsupported credential store version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl StoreError {
    /// True when the store file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Remote call that failed while applying a status to one workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    SetPresence,
    SetCustomStatus,
    SetSnooze,
    ResetSnooze,
    SetProfilePicture,
}

impl fmt::Display for ApplyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ApplyStep::SetPresence => "set presence",
            ApplyStep::SetCustomStatus => "set custom status",
            ApplyStep::SetSnooze => "set snooze",
            ApplyStep::ResetSnooze => "reset snooze",
            ApplyStep::SetProfilePicture => "set profile picture",
        };
        f.write_str(text)
    }
}

/// A per-workspace failure, carrying the workspace name for context.
#[derive(Debug, Error)]
#[error("failed to {step} in: {workspace}: {source}")]
pub struct WorkspaceError {
    pub workspace: String,
    pub step: ApplyStep,
    #[source]
    pub source: Box<ApiError>,
}

/// The status run halted at a workspace; `applied` workspaces had already completed.
#[derive(Debug, Error)]
#[error("{failure} (status applied to {applied} workspace(s) before the failure)")]
pub struct ApplyError {
    pub applied: usize,
    #[source]
    pub failure: WorkspaceError,
}

/// Top-level errors surfaced by the library and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Credential store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Timed out after {0:?} waiting for the OAuth2 redirect")]
    AuthorizationTimeout(Duration),

    #[error("Authorization cancelled before the OAuth2 redirect arrived")]
    AuthorizationCancelled,

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error(transparent)]
    ApplyFailed(#[from] ApplyError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
