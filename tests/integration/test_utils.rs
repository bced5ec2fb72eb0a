//! Shared test utilities for integration tests
//!
//! Isolated XDG/HOME environment, a stub Slack Web API served from a background thread,
//! and helpers to write credential stores.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex as PlMutex;
use serde_json::{json, Value};
use slack_status::config::AppConfig;
use slack_status::store::{CredentialStorage, CredentialStore, TomlFileStorage, WorkspaceCredential};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::oneshot;

/// Global mutex to serialize environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir`, restoring them afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("config");
    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_config_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());

    let result = f();

    env_state.restore();

    result
}

/// One request received by the stub
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedCall {
    pub fn token(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .and_then(|h| h.strip_prefix("Bearer "))
    }
}

#[derive(Default)]
struct StubState {
    calls: PlMutex<Vec<RecordedCall>>,
    /// (token, method) pairs answered with `{"ok": false}`
    failures: PlMutex<HashMap<(String, String), String>>,
    oauth_response: PlMutex<Option<Value>>,
}

/// Stub Slack Web API at `http://<addr>/api/<method>`, served on its own runtime thread.
pub struct StubSlack {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

async fn handle_method(
    State(state): State<Arc<StubState>>,
    Path(method): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let call = RecordedCall {
        method: method.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let token = call.token().unwrap_or_default().to_string();
    state.calls.lock().push(call);

    if method == "oauth.v2.access" {
        return Json(
            state
                .oauth_response
                .lock()
                .clone()
                .unwrap_or_else(|| json!({ "ok": false, "error": "invalid_code" })),
        );
    }
    if let Some(error) = state.failures.lock().get(&(token, method)) {
        return Json(json!({ "ok": false, "error": error }));
    }
    Json(json!({ "ok": true }))
}

impl StubSlack {
    pub fn start() -> Self {
        let state = Arc::new(StubState::default());
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_state = Arc::clone(&state);
        let thread = std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let app = Router::new()
                    .route("/api/{method}", post(handle_method))
                    .with_state(server_state);
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    pub fn api_base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Settings pointing every Slack call at this stub.
    pub fn app_config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.slack.api_base_url = self.api_base_url();
        config.slack.authorize_url = format!("http://{}/oauth/v2/authorize", self.addr);
        config
    }

    pub fn fail(&self, token: &str, method: &str, error: &str) {
        self.state
            .failures
            .lock()
            .insert((token.to_string(), method.to_string()), error.to_string());
    }

    pub fn set_oauth_response(&self, response: Value) {
        *self.state.oauth_response.lock() = Some(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().clone()
    }

    /// Tokens in the order workspaces were contacted, consecutive duplicates collapsed.
    pub fn tokens_contacted(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for call in self.calls() {
            let Some(token) = call.token() else { continue };
            if tokens.last().map(String::as_str) != Some(token) {
                tokens.push(token.to_string());
            }
        }
        tokens
    }
}

impl Drop for StubSlack {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Write a store with the given workspaces and return its path.
pub fn write_store(dir: &FsPath, workspaces: Vec<WorkspaceCredential>) -> PathBuf {
    let path = dir.join("slack-status.toml");
    let mut store = CredentialStore::default();
    for workspace in workspaces {
        store.append(workspace);
    }
    TomlFileStorage::new(path.clone()).save(&store).unwrap();
    path
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
