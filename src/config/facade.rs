//! Config loader: builds [`AppConfig`] from defaults, settings files and environment.

use super::merge::merge_policy;
use super::sources::{env, global_file, settings_file};
use super::AppConfig;
use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Loads application settings. Precedence (highest first): environment, explicit settings
/// file, global settings file, built-in defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings, optionally layering an explicit settings file over the global one.
    pub fn load(settings_path: Option<&Path>) -> Result<AppConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = settings_path {
            builder = settings_file::add_to_builder(builder, path)?;
        }
        builder = env::add_to_builder(builder);

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load settings from a single file on top of defaults, ignoring global file and env.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = settings_file::add_to_builder(builder, path)?;
        let config: AppConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Global settings file location.
    pub fn global_settings_path() -> Option<PathBuf> {
        super::paths::global_settings_path()
    }

    fn validated(config: AppConfig) -> Result<AppConfig, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
