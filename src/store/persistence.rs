//! Persistence layer for the credential store: one TOML document on disk.

use crate::error::StoreError;
use crate::store::{CredentialStorage, CredentialStore};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML file implementation of CredentialStorage
pub struct TomlFileStorage {
    path: PathBuf,
}

impl TomlFileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store, treating a missing file as an empty store.
    /// Any other read, parse or validation failure is still an error.
    pub fn load_or_default(&self) -> Result<CredentialStore, StoreError> {
        match self.load() {
            Ok(store) => Ok(store),
            Err(e) if e.is_not_found() => {
                debug!(path = %self.path.display(), "Credential store not found, starting empty");
                Ok(CredentialStore::default())
            }
            Err(e) => Err(e),
        }
    }
}

impl CredentialStorage for TomlFileStorage {
    fn load(&self) -> Result<CredentialStore, StoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let store: CredentialStore =
            toml::from_str(&contents).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        store.validate()?;
        debug!(
            path = %self.path.display(),
            workspaces = store.workspaces.len(),
            "Loaded credential store"
        );
        Ok(store)
    }

    fn save(&self, store: &CredentialStore) -> Result<(), StoreError> {
        store.validate()?;
        let data = toml::to_string_pretty(store)?;

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(write_err)?;
        file.write_all(data.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        debug!(path = %self.path.display(), "Saved credential store");
        Ok(())
    }
}
