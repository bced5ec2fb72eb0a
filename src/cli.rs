//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, InitArgs, SetArgs};
pub use presentation::{
    format_init_summary, format_set_summary, format_version, format_workspaces_table,
};
pub use route::RunContext;
