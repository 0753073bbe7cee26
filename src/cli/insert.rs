//! Insert command.
//!
//! Encrypt a value into an entry. The value comes from stdin when it is piped,
//! otherwise from a hidden prompt.

use std::io::{self, IsTerminal, Read, Write};

use dialoguer::Password;
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::{output, Context};
use crate::core::store::normalize;
use crate::error::{Error, Result};

/// Insert an entry.
pub fn execute(ctx: &Context, entry: &str, force: bool) -> Result<()> {
    info!("Inserting entry: {}", entry);

    let store = ctx.open_store()?;
    if store.contains(entry) && !force {
        return Err(Error::EntryExists(normalize(entry)));
    }

    let value = read_value(entry)?;

    let mut writer = store.write(entry)?;
    writer.write_all(&value)?;
    writer.finish()?;

    output::success(&format!("wrote {}", output::path(&normalize(entry))));
    Ok(())
}

fn read_value(entry: &str) -> Result<Zeroizing<Vec<u8>>> {
    let mut value = Zeroizing::new(Vec::new());

    if !io::stdin().is_terminal() {
        io::stdin().read_to_end(&mut value)?;
    } else {
        let input = Zeroizing::new(
            Password::new()
                .with_prompt(format!("Value for {}", output::path(entry)))
                .with_confirmation("Repeat value", "values do not match")
                .interact()
                .map_err(|e| Error::Prompt(e.to_string()))?,
        );
        value.extend_from_slice(input.as_bytes());
    }

    Ok(value)
}
