//! Ls command.
//!
//! List folders and entries at the store root.

use crate::cli::{output, Context};
use crate::core::constants::ENTRY_SUFFIX;
use crate::error::Result;

/// List the store root.
pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let store = ctx.open_store()?;

    let mut folders = store.sub_folders();
    let mut entries = store.list();
    folders.sort();
    entries.sort();

    if json {
        let result = serde_json::json!({
            "folders": folders,
            "entries": entries,
        });
        output::data(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if folders.is_empty() && entries.is_empty() {
        output::dimmed("store is empty");
        return Ok(());
    }

    output::header(&store.root().display().to_string());
    output::rule();
    for folder in &folders {
        output::list_item(&output::path(&format!("{}/", folder)));
    }
    for entry in &entries {
        output::list_item(entry.strip_suffix(ENTRY_SUFFIX).unwrap_or(entry));
    }

    Ok(())
}
