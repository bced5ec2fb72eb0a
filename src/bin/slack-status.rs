//! slack-status CLI Binary

use clap::Parser;
use slack_status::cli::{Cli, RunContext};
use slack_status::config::ConfigLoader;
use slack_status::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let context = match RunContext::new(&cli.config, cli.settings.as_deref()) {
        Ok(ctx) => {
            debug!(store = %ctx.store_path().display(), "CLI context initialized");
            ctx
        }
        Err(e) => {
            error!("Error loading settings: {}", e);
            eprintln!("{}", slack_status::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.resolved_command()) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", slack_status::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and settings.
/// Precedence: CLI flags override settings file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load(cli.settings.as_deref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
