//! Merge rules: defaults, override order, conflict handling.

use super::super::{
    DEFAULT_API_BASE_URL, DEFAULT_AUTHORIZE_URL, DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_HTTP_BIND,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_REDIRECT_URI, DEFAULT_SCOPES,
};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
/// Later sources (global file, explicit settings file, environment) override these in order.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("slack.api_base_url", DEFAULT_API_BASE_URL)?
        .set_default("slack.authorize_url", DEFAULT_AUTHORIZE_URL)?
        .set_default("slack.http_timeout_secs", DEFAULT_HTTP_TIMEOUT_SECS)?
        .set_default("auth.http_bind", DEFAULT_HTTP_BIND)?
        .set_default("auth.redirect_uri", DEFAULT_REDIRECT_URI)?
        .set_default("auth.scopes", DEFAULT_SCOPES)?
        .set_default("auth.timeout_secs", DEFAULT_AUTH_TIMEOUT_SECS)
}
