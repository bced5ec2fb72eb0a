//! Settings layering: global XDG file, explicit settings file, environment

use crate::integration::test_utils::with_xdg_env;
use slack_status::cli::RunContext;
use slack_status::config::{ConfigLoader, DEFAULT_API_BASE_URL, DEFAULT_STORE_PATH};
use std::path::Path;
use tempfile::TempDir;

fn write_global(test_dir: &TempDir, contents: &str) {
    let dir = test_dir.path().join("config").join("slack-status");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn defaults_without_any_settings_file() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let config = ConfigLoader::load(None).unwrap();
        assert_eq!(config.slack.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.auth.timeout_secs, 300);
    });
}

#[test]
fn global_file_is_read_from_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    write_global(&test_dir, "[auth]\nhttp_bind = \"127.0.0.1:4000\"\n");
    with_xdg_env(&test_dir, || {
        let config = ConfigLoader::load(None).unwrap();
        assert_eq!(config.auth.http_bind, "127.0.0.1:4000");
    });
}

#[test]
fn explicit_settings_file_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    write_global(
        &test_dir,
        "[auth]\nhttp_bind = \"127.0.0.1:4000\"\nscopes = \"users:write\"\n",
    );
    let explicit = test_dir.path().join("explicit.toml");
    std::fs::write(&explicit, "[auth]\nhttp_bind = \"127.0.0.1:5000\"\n").unwrap();

    with_xdg_env(&test_dir, || {
        let config = ConfigLoader::load(Some(&explicit)).unwrap();
        assert_eq!(config.auth.http_bind, "127.0.0.1:5000");
        assert_eq!(config.auth.scopes, "users:write");
    });
}

#[test]
fn environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    write_global(&test_dir, "[slack]\nhttp_timeout_secs = 20\n");
    with_xdg_env(&test_dir, || {
        std::env::set_var("SLACK_STATUS__SLACK__HTTP_TIMEOUT_SECS", "45");
        let result = ConfigLoader::load(None);
        std::env::remove_var("SLACK_STATUS__SLACK__HTTP_TIMEOUT_SECS");
        assert_eq!(result.unwrap().slack.http_timeout_secs, 45);
    });
}

#[test]
fn missing_explicit_settings_file_fails() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let missing = test_dir.path().join("nope.toml");
        assert!(RunContext::new(Path::new(DEFAULT_STORE_PATH), Some(&missing)).is_err());
    });
}

#[test]
fn default_store_path_expands_home() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let ctx = RunContext::new(Path::new(DEFAULT_STORE_PATH), None).unwrap();
        assert_eq!(
            ctx.store_path(),
            test_dir.path().join("home").join(".slack-status")
        );
    });
}
