//! passgo - manage your passwords.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use passgo::cli::output;
use passgo::cli::{execute, Cli, Context};
use passgo::core::constants::LOG_ENV;
use passgo::error::Error;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("passgo=debug")
        } else {
            EnvFilter::new("passgo=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let ctx = Context::new(cli.keyring, cli.store);

    if let Err(e) = execute(cli.command, &ctx) {
        let suggestion = match &e {
            Error::Path { path, .. } if path.ends_with(".gpg-id") => {
                Some("run: passgo init <identity>...")
            }
            Error::Path { path, .. } if path == ctx.keyring_path() => {
                Some("run: passgo keys generate <identity>")
            }
            Error::UnknownIdentity(_) => Some("run: passgo keys list"),
            Error::NoRecipient => Some("add a key for one of the identities in .gpg-id"),
            Error::Decryption(_) => Some("check that your key is listed in .gpg-id"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
