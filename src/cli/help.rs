//! CLI command-name contract used in log spans.

use crate::cli::parse::Commands;

/// Stable command name for logging ("set", "init", ...).
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Set(_) => "set",
        Commands::Init(_) => "init",
        Commands::Workspaces => "workspaces",
        Commands::Version => "version",
    }
}
