//! CLI parsing and command handlers for keychain-cli

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use keychain_cli::completion::{self, KEY_COMMANDS};
use keychain_cli::{CredentialStore, SecretStore, StoreError};
use keychain_core::{format, Config, Paths};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "keychain-cli")]
#[command(about = "Store, read, list and delete secrets in the OS keychain")]
#[command(version)]
#[command(after_help = r#"STORAGE:
    - Each secret is one keychain entry: service = key, account = current user
    - Key names are tracked in the "keychain-cli-keys" entry so they can be listed
    - Config file: ~/.config/keychain-cli/config.json
    - Set KEYCHAIN_CLI_ACCOUNT to use a different account

COMPLETION:
    source <(keychain-cli completion --shell bash)
    keychain-cli completion --shell fish | source
    Key names are offered after `get` and `delete`"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all secrets
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Get a specific secret by key
    Get {
        /// Don't print trailing newline (useful for piping)
        #[arg(short = 'n')]
        no_newline: bool,
        /// Secret key name
        key: Option<String>,
    },

    /// Create/update a secret
    Set {
        /// Secret key name
        key: Option<String>,
        /// Secret value
        secret: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret key name
        key: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[arg(long)]
        shell: Option<Shell>,
    },

    /// Print key name candidates for a partially typed command
    #[command(hide = true)]
    Complete {
        /// Command being completed
        command: String,
        /// Arguments typed so far
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Configuration and account for one invocation
pub struct Settings {
    pub config: Config,
    pub account: String,
}

impl Settings {
    /// Load the config (from `config_path` or the default location) and
    /// resolve the account against `env`
    pub fn load<F>(config_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => Config::load(&Paths::new().config_file())?,
        };
        let account = config.resolve_account(env);
        Ok(Self { config, account })
    }

    pub fn context<'a>(&'a self, backend: &'a dyn CredentialStore) -> Context<'a> {
        Context {
            backend,
            config: &self.config,
            account: &self.account,
        }
    }
}

/// Everything a command needs besides its arguments
pub struct Context<'a> {
    pub backend: &'a dyn CredentialStore,
    pub config: &'a Config,
    pub account: &'a str,
}

impl<'a> Context<'a> {
    fn open(&self) -> Result<SecretStore<'a>> {
        Ok(SecretStore::open(
            self.backend,
            self.account,
            &self.config.index_service,
        )?)
    }
}

pub fn run(command: Commands, ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::List { json } => cmd_list(ctx, out, json),
        Commands::Get { no_newline, key } => cmd_get(ctx, out, key, no_newline),
        Commands::Set { key, secret } => cmd_set(ctx, out, key, secret),
        Commands::Delete { key } => cmd_delete(ctx, out, key),
        Commands::Completion { shell } => cmd_completion(out, shell),
        Commands::Complete { command, args } => cmd_complete(ctx, out, &command, &args),
    }
}

fn require_key(key: Option<String>) -> Result<String, StoreError> {
    key.filter(|k| !k.is_empty()).ok_or(StoreError::MissingKey)
}

/// Store a secret
fn cmd_set(
    ctx: &Context<'_>,
    out: &mut dyn Write,
    key: Option<String>,
    secret: Option<String>,
) -> Result<()> {
    let key = require_key(key)?;
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or(StoreError::MissingSecret)?;

    let mut store = ctx.open()?;
    store.set_secret(&key, &secret)?;

    writeln!(
        out,
        "Set secret {}={}",
        key,
        format::mask(&secret, ctx.config.mask_char)
    )?;
    Ok(())
}

/// List all known keys
fn cmd_list(ctx: &Context<'_>, out: &mut dyn Write, json: bool) -> Result<()> {
    let mut store = ctx.open()?;
    let keys = store.list_keys()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&keys)?)?;
        return Ok(());
    }

    for key in &keys {
        writeln!(out, "{}", key)?;
    }
    Ok(())
}

/// Print a secret
fn cmd_get(
    ctx: &Context<'_>,
    out: &mut dyn Write,
    key: Option<String>,
    no_newline: bool,
) -> Result<()> {
    let key = require_key(key)?;

    let store = ctx.open()?;
    let secret = store.get_secret(&key)?;

    if no_newline {
        write!(out, "{}", secret)?;
    } else {
        writeln!(out, "{}", secret)?;
    }
    Ok(())
}

/// Delete a secret
fn cmd_delete(ctx: &Context<'_>, out: &mut dyn Write, key: Option<String>) -> Result<()> {
    let key = require_key(key)?;

    let mut store = ctx.open()?;
    store.delete_secret(&key)?;

    writeln!(out, "Deleted secret {}", key)?;
    Ok(())
}

/// Generate a completion script
fn cmd_completion(out: &mut dyn Write, shell: Option<Shell>) -> Result<()> {
    let Some(shell) = shell.or_else(Shell::from_env) else {
        bail!("Couldn't autodetect a valid shell. Run `keychain-cli completion --help` for more info.");
    };

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name.clone(), out);

    if let Some(hook) = completion::key_hook(shell, &name) {
        out.write_all(hook.as_bytes())?;
    }
    Ok(())
}

/// Print key candidates for `get`/`delete`
fn cmd_complete(
    ctx: &Context<'_>,
    out: &mut dyn Write,
    command: &str,
    args: &[String],
) -> Result<()> {
    if !KEY_COMMANDS.contains(&command) {
        return Ok(());
    }

    let mut store = ctx.open()?;
    let keys = store.list_keys()?;

    for key in completion::candidates(command, &keys, args) {
        writeln!(out, "{}", key)?;
    }
    Ok(())
}
