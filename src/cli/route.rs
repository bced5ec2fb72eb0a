//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::auth::{AuthorizationRequest, Authorizer};
use crate::cli::command_name;
use crate::cli::parse::{Commands, InitArgs, SetArgs};
use crate::cli::presentation::{
    format_init_summary, format_set_summary, format_version, format_workspaces_table,
};
use crate::config::{expand_home, AppConfig, AuthConfig, ConfigLoader};
use crate::error::ApiError;
use crate::provider::SlackClient;
use crate::status::duration::parse_span_seconds;
use crate::status::{parse_duration_minutes, StatusEngine, StatusIntent, SystemClock};
use crate::store::{CredentialStorage, TomlFileStorage, WorkspaceCredential};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{info, info_span};

/// Runtime context for CLI execution: loaded settings and the credential store location.
pub struct RunContext {
    config: AppConfig,
    store_path: PathBuf,
}

impl RunContext {
    /// Load settings (global file, optional explicit file, environment) and resolve the store path.
    pub fn new(store_path: &Path, settings_path: Option<&Path>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(settings_path)?;
        Ok(Self::with_config(config, store_path))
    }

    pub fn with_config(config: AppConfig, store_path: &Path) -> Self {
        Self {
            config,
            store_path: expand_home(store_path),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let _span = info_span!("command", command = command_name(command)).entered();
        match command {
            Commands::Set(args) => self.handle_set(args),
            Commands::Init(args) => self.handle_init(args),
            Commands::Workspaces => {
                let store = self.storage().load()?;
                Ok(format_workspaces_table(&store))
            }
            Commands::Version => Ok(format_version()),
        }
    }

    fn storage(&self) -> TomlFileStorage {
        TomlFileStorage::new(self.store_path.clone())
    }

    fn handle_set(&self, args: &SetArgs) -> Result<String, ApiError> {
        // input and store problems surface before any remote call
        let intent = build_intent(args)?;
        let store = self.storage().load()?;
        let client = SlackClient::new(&self.config.slack)?;
        let clock = SystemClock;
        let engine = StatusEngine::new(&client, &clock);

        let rt = runtime()?;
        let applied = rt.block_on(engine.apply(&intent, store.workspaces()))?;
        info!(applied, "Status applied");
        Ok(format_set_summary(applied))
    }

    fn handle_init(&self, args: &InitArgs) -> Result<String, ApiError> {
        let request = authorization_request(args, &self.config.auth)?;
        let storage = self.storage();
        // a missing store starts empty; a malformed one must not be overwritten
        let mut store = storage.load_or_default()?;

        let client = SlackClient::new(&self.config.slack)?;
        let authorizer = Authorizer::new(&client, self.config.slack.authorize_url.clone());

        let rt = runtime()?;
        let user = rt.block_on(authorizer.authorize(
            &request,
            |prompt| {
                info!(addr = %prompt.listening_on, "Waiting for the OAuth2 redirect");
                println!(
                    "Open the following URL in your browser to authorize slack-status:\n\n{}\n",
                    prompt.url
                );
            },
            interrupted(),
        ))?;
        info!(user = %user.user_id, team = ?user.team, "Authorization succeeded");

        let user_id = Some(user.user_id).filter(|id| !id.is_empty());
        let credential = WorkspaceCredential::new(args.workspace.clone(), user_id, user.access_token)
            .with_groups(args.groups.iter().cloned());
        store.append(credential.clone());
        storage.save(&store)?;

        Ok(format_init_summary(&credential, storage.path()))
    }
}

fn runtime() -> Result<Runtime, ApiError> {
    Runtime::new().map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed it never resolves.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Build and validate the status intent from `set` flags.
pub(crate) fn build_intent(args: &SetArgs) -> Result<StatusIntent, ApiError> {
    let intent = StatusIntent {
        message: args.message.clone(),
        emoji: args.emoji.clone(),
        duration_minutes: parse_duration_minutes(args.duration.as_deref())?,
        away: args.away,
        do_not_disturb: args.dnd,
        group: args.group.clone().filter(|g| !g.is_empty()),
        workspace: args.workspace.clone().filter(|w| !w.is_empty()),
        profile_picture: args.profile_pic.clone(),
    };
    intent.validate()?;
    Ok(intent)
}

/// Merge `init` flags over the `[auth]` settings.
pub(crate) fn authorization_request(
    args: &InitArgs,
    auth: &AuthConfig,
) -> Result<AuthorizationRequest, ApiError> {
    let timeout = match args.timeout.as_deref() {
        Some(raw) => {
            let seconds = parse_span_seconds(raw)?;
            if seconds < 0.0 {
                return Err(ApiError::InvalidInput(format!(
                    "authorization timeout cannot be negative: {}",
                    raw
                )));
            }
            let timeout = Duration::try_from_secs_f64(seconds).map_err(|_| {
                ApiError::InvalidInput(format!("authorization timeout is too long: {}", raw))
            })?;
            Some(timeout).filter(|d| !d.is_zero())
        }
        None => Some(Duration::from_secs(auth.timeout_secs)).filter(|d| !d.is_zero()),
    };

    Ok(AuthorizationRequest {
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
        redirect_uri: args
            .redirect_uri
            .clone()
            .unwrap_or_else(|| auth.redirect_uri.clone()),
        scopes: args.scopes.clone().unwrap_or_else(|| auth.scopes.clone()),
        http_bind: args.http_bind.clone().unwrap_or_else(|| auth.http_bind.clone()),
        timeout,
    })
}
