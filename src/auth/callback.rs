//! One-shot OAuth2 redirect listener.
//!
//! Serves a single route. The first request carrying a `code` query parameter hands the
//! code to the waiting caller through a one-shot channel; requests without a code get a
//! 400 and leave the listener running.

use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Body returned to the browser once the code has been captured
pub const CONFIRMATION_BODY: &str =
    "Successfully got Temporary Authorization Code, you may close this tab.\n";

#[derive(Clone)]
struct CallbackState {
    // Taken by the first valid redirect, so the signal can fire at most once.
    code_tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

async fn handle_redirect(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        match params.get("error") {
            Some(error) => warn!(error = %error, "OAuth2 redirect carried an error instead of a code"),
            None => warn!("OAuth2 redirect did not receive code parameter"),
        }
        return (StatusCode::BAD_REQUEST, String::new());
    };

    let sender = state.code_tx.lock().take();
    match sender {
        Some(tx) => {
            info!("OAuth2 redirect received temporary authorization code");
            if tx.send(code.clone()).is_err() {
                debug!("Authorization wait already ended, dropping code");
            }
            (StatusCode::OK, CONFIRMATION_BODY.to_string())
        }
        None => (
            StatusCode::CONFLICT,
            "An authorization code was already received.\n".to_string(),
        ),
    }
}

/// A running redirect listener
pub struct CallbackServer {
    local_addr: SocketAddr,
    code_rx: oneshot::Receiver<String>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl CallbackServer {
    /// Bind `bind_addr` and start serving `path` on a spawned task.
    pub async fn bind(bind_addr: &str, path: &str) -> Result<Self, ApiError> {
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            ApiError::CallbackServer(format!("Failed to bind {}: {}", bind_addr, e))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ApiError::CallbackServer(format!("Failed to read bound address: {}", e)))?;

        let (code_tx, code_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let state = CallbackState {
            code_tx: Arc::new(Mutex::new(Some(code_tx))),
        };
        let router = Router::new()
            .route(path, get(handle_redirect))
            .with_state(state);

        info!(addr = %local_addr, path, "Starting OAuth2 redirect listener");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(Self {
            local_addr,
            code_rx,
            shutdown_tx,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until a code arrives, the timeout elapses or `cancel` resolves, then close
    /// the listener. A listener that fails to close is reported as an error even when a
    /// code was received.
    pub async fn wait_for_code<C>(
        self,
        timeout: Option<Duration>,
        cancel: C,
    ) -> Result<String, ApiError>
    where
        C: Future<Output = ()>,
    {
        let Self {
            code_rx,
            shutdown_tx,
            handle,
            ..
        } = self;

        let outcome = tokio::select! {
            code = code_rx => code.map_err(|_| {
                ApiError::CallbackServer("listener stopped before a code arrived".to_string())
            }),
            _ = deadline(timeout) => Err(ApiError::AuthorizationTimeout(timeout.unwrap_or_default())),
            _ = cancel => Err(ApiError::AuthorizationCancelled),
        };

        debug!("Shutting down OAuth2 redirect listener");
        let _ = shutdown_tx.send(());
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ApiError::CallbackServer(format!(
                    "Failed to close redirect listener: {}",
                    e
                )))
            }
            Err(e) => {
                return Err(ApiError::CallbackServer(format!(
                    "Redirect listener task failed: {}",
                    e
                )))
            }
        }

        outcome
    }
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending::<()>().await,
    }
}
