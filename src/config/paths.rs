//! Filesystem locations: settings directory and credential store path expansion.

use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

/// Credential store location used when `--config` is not given.
pub const DEFAULT_STORE_PATH: &str = "~/.slack-status";

const APPLICATION: &str = "slack-status";

/// Settings directory ($XDG_CONFIG_HOME/slack-status on Linux).
pub fn settings_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Global settings file path, whether or not it exists.
pub fn global_settings_path() -> Option<PathBuf> {
    settings_dir().map(|dir| dir.join("config.toml"))
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~` are returned unchanged. When no home directory can be
/// determined the path is returned as given.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(base) => base.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
