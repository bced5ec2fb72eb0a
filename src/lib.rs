//! slack-status: set status, presence and do-not-disturb across multiple Slack workspaces.
//!
//! Two entry points share the credential store: the OAuth2 flow in [`auth`] links a new
//! workspace, and the [`status::StatusEngine`] applies one status intent to every matching
//! workspace in store order.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod status;
pub mod store;
