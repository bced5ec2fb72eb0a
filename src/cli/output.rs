//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StoreError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StoreError(store) if store.is_not_found() => format!(
            "{}\nRun `slack-status init <workspace> <clientId> <clientSecret>` to link a workspace first.",
            e
        ),
        ApiError::StoreError(StoreError::MissingAccessToken { .. }) => format!(
            "{}\nEvery workspace entry needs an accessToken; fix or remove the entry.",
            e
        ),
        ApiError::StoreError(StoreError::Parse { .. }) => format!(
            "{}\nThe credential store must be a TOML document (version = 1). A store written by an older YAML release has to be re-created with `slack-status init`.",
            e
        ),
        _ => e.to_string(),
    }
}
