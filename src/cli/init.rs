//! Init command - create the store and write its recipient list.

use tracing::info;

use crate::cli::{output, Context};
use crate::core::constants::RECIPIENTS_FILE;
use crate::core::recipient::RecipientList;
use crate::error::Result;

/// Write `.gpg-id` at the store root.
pub fn execute(ctx: &Context, identities: Vec<String>) -> Result<()> {
    info!("Initializing store at {}", ctx.store_root().display());

    // Unknown identities are allowed; their keys may be imported later.
    if let Ok(keyring) = ctx.load_keyring() {
        for identity in identities.iter().filter(|i| keyring.find(i).is_none()) {
            output::warn(&format!("no key in the keyring for {}", identity));
        }
    }

    let list = RecipientList::new(identities);
    list.write(ctx.store_root())?;

    let path = ctx.store_root().join(RECIPIENTS_FILE);
    output::success(&format!(
        "initialized {} for {} recipient(s)",
        output::path(&path.display().to_string()),
        list.len()
    ));
    Ok(())
}
