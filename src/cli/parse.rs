//! CLI parse: clap types for slack-status. No behavior; definitions only.

use crate::config::DEFAULT_STORE_PATH;
use crate::status::DEFAULT_EMOJI;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// slack-status - set your status across multiple Slack workspaces
#[derive(Parser, Debug)]
#[command(name = "slack-status", version, disable_version_flag = true)]
#[command(about = "Set your Slack status, presence and do-not-disturb across multiple workspaces")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Status flags for the bare command (same as `set`)
    #[command(flatten)]
    pub set: SetArgs,

    /// Print the version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Credential store path
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_STORE_PATH)]
    pub config: PathBuf,

    /// Application settings file (layered over the global settings file)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (used when output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The command to run; the bare invocation behaves like `set`.
    pub fn resolved_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Set(self.set.clone()))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Set status, presence and do-not-disturb on the selected workspaces
    Set(SetArgs),
    /// Link a new workspace through the OAuth2 flow
    Init(InitArgs),
    /// List linked workspaces and their groups
    Workspaces,
    /// Print the version
    Version,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SetArgs {
    /// Status message; empty clears the status
    #[arg(short = 'm', long, default_value = "")]
    pub message: String,

    /// Status emoji (ignored when the message is empty)
    #[arg(short = 'e', long, default_value = DEFAULT_EMOJI)]
    pub emoji: String,

    /// How long the status lasts, e.g. 30m or 1h30m; also the do-not-disturb length
    #[arg(short = 'd', long)]
    pub duration: Option<String>,

    /// Set presence to away
    #[arg(long)]
    pub away: bool,

    /// Snooze notifications for the duration
    #[arg(long)]
    pub dnd: bool,

    /// Only workspaces in this group
    #[arg(short = 'g', long)]
    pub group: Option<String>,

    /// Only the workspace with this name
    #[arg(short = 'w', long)]
    pub workspace: Option<String>,

    /// Profile picture to upload (jpeg, jpg, png or gif)
    #[arg(short = 'p', long = "profile-pic")]
    pub profile_pic: Option<PathBuf>,
}

impl Default for SetArgs {
    fn default() -> Self {
        Self {
            message: String::new(),
            emoji: DEFAULT_EMOJI.to_string(),
            duration: None,
            away: false,
            dnd: false,
            group: None,
            workspace: None,
            profile_pic: None,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    /// Name for the new workspace entry
    pub workspace: String,

    /// Slack app client id
    pub client_id: String,

    /// Slack app client secret
    pub client_secret: String,

    /// Redirect listener bind address (defaults to the [auth] setting)
    #[arg(long)]
    pub http_bind: Option<String>,

    /// Comma separated user scopes (defaults to the [auth] setting)
    #[arg(long)]
    pub scopes: Option<String>,

    /// OAuth2 redirect URI (defaults to the [auth] setting)
    #[arg(long)]
    pub redirect_uri: Option<String>,

    /// How long to wait for the redirect, e.g. 5m; 0 waits indefinitely
    #[arg(long)]
    pub timeout: Option<String>,

    /// Group labels for the new workspace
    #[arg(short = 'g', long = "group")]
    pub groups: Vec<String>,
}
