//! Show command - decrypt an entry to stdout.

use std::io::{self, Write};

use tracing::info;

use crate::cli::Context;
use crate::error::Result;

/// Print an entry's plaintext.
pub fn execute(ctx: &Context, entry: &str) -> Result<()> {
    info!("Showing entry: {}", entry);

    let store = ctx.open_store()?;
    let mut reader = store.read(entry)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut reader, &mut out)?;
    out.flush()?;
    Ok(())
}
