//! Credential Store
//!
//! Holds the linked workspaces: a name, the user the token belongs to, the access token
//! itself and a set of group labels used to target several workspaces at once.

pub mod persistence;

pub use persistence::TomlFileStorage;

use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Store document schema version written by this build.
pub const STORE_VERSION: u32 = 1;

fn default_version() -> u32 {
    STORE_VERSION
}

/// One linked workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCredential {
    /// Operator-chosen label; unique by convention only
    pub name: String,

    /// Slack user id bound to the token. Informational: status calls act as the token owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// User OAuth token (`xoxp-...`)
    #[serde(rename = "accessToken", default)]
    pub access_token: String,

    /// Group labels; order and duplicates carry no meaning
    #[serde(default)]
    pub groups: Vec<String>,
}

impl WorkspaceCredential {
    pub fn new(name: impl Into<String>, user: Option<String>, access_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user,
            access_token: access_token.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// The whole credential document, read and written as one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub workspaces: Vec<WorkspaceCredential>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            workspaces: Vec::new(),
        }
    }
}

impl CredentialStore {
    /// Check the version tag and that every workspace carries a token.
    /// One bad entry invalidates the whole store.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                supported: STORE_VERSION,
            });
        }
        for (index, workspace) in self.workspaces.iter().enumerate() {
            if workspace.access_token.trim().is_empty() {
                return Err(StoreError::MissingAccessToken {
                    index,
                    name: workspace.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Append a newly linked workspace. Existing entries with the same name are kept.
    pub fn append(&mut self, workspace: WorkspaceCredential) {
        self.workspaces.push(workspace);
    }

    pub fn workspaces(&self) -> &[WorkspaceCredential] {
        &self.workspaces
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

/// Durable storage for the credential document
pub trait CredentialStorage {
    /// Load and validate the store. Fails closed on any invalid entry.
    fn load(&self) -> Result<CredentialStore, StoreError>;

    /// Persist the whole store.
    fn save(&self, store: &CredentialStore) -> Result<(), StoreError>;
}
