//! keychain-cli - Command-line credential store
//!
//! Secrets are kept in the OS keychain; their names in a key index entry.
//!
//! Commands:
//! - set <KEY> <SECRET>: Create/update a secret (prints it masked)
//! - get <KEY>: Print a secret
//! - delete <KEY>: Delete a secret
//! - list: List all secret keys
//! - completion: Generate a shell completion script

mod cli;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use keychain_cli::KeyringStore;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Settings};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = Settings::load(cli.config.as_deref(), |name| std::env::var(name).ok())?;
    let backend = KeyringStore::new();
    let ctx = settings.context(&backend);

    let mut stdout = std::io::stdout().lock();
    cli::run(command, &ctx, &mut stdout)
}
