//! Command-line interface.

pub mod completions;
pub mod context;
pub mod init;
pub mod insert;
pub mod keys;
pub mod ls;
pub mod output;
pub mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constants::{DEFAULT_KEYRING, DEFAULT_STORE, KEYRING_ENV, STORE_ENV};
pub use context::Context;

/// passgo - manage your passwords.
#[derive(Parser)]
#[command(name = "passgo", about = "manage your passwords", version)]
pub struct Cli {
    /// Path to the keyring file
    #[arg(long, global = true, env = KEYRING_ENV, default_value = DEFAULT_KEYRING)]
    pub keyring: PathBuf,

    /// Path to the password store folder
    #[arg(long, global = true, env = STORE_ENV, default_value = DEFAULT_STORE)]
    pub store: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create the store and set who may read it
    Init {
        /// Identities allowed to read and write entries
        #[arg(required = true)]
        identities: Vec<String>,
    },

    /// List entries and folders at the store root
    Ls {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decrypt an entry to stdout
    Show {
        /// Entry name (".gpg" optional)
        entry: String,
    },

    /// Encrypt stdin (or a prompted value) into an entry
    Insert {
        /// Entry name (".gpg" optional)
        entry: String,
        /// Overwrite if the entry exists
        #[arg(short, long)]
        force: bool,
    },

    /// Manage keyring entities
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Keyring subcommands.
#[derive(Subcommand)]
pub enum KeysAction {
    /// Generate a new key entity
    Generate {
        /// Identities naming the new entity
        #[arg(required = true)]
        identities: Vec<String>,
        /// Store the secret key without a passphrase
        #[arg(long)]
        no_passphrase: bool,
    },

    /// Add a fresh encryption subkey to an entity
    Subkey {
        /// Any identity of the entity
        identity: String,
        /// Store the secret key without a passphrase
        #[arg(long)]
        no_passphrase: bool,
    },

    /// List keyring entities
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command, ctx: &Context) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init { identities } => init::execute(ctx, identities),
        Ls { json } => ls::execute(ctx, json),
        Show { entry } => show::execute(ctx, &entry),
        Insert { entry, force } => insert::execute(ctx, &entry, force),
        Keys { action } => match action {
            KeysAction::Generate {
                identities,
                no_passphrase,
            } => keys::generate(ctx, identities, no_passphrase),
            KeysAction::Subkey {
                identity,
                no_passphrase,
            } => keys::subkey(ctx, &identity, no_passphrase),
            KeysAction::List { json } => keys::list(ctx, json),
        },
        Completions { shell } => completions::execute(shell),
    }
}
