//! Directory enumeration for a store root.
//!
//! Listing fails soft: an unreadable root yields nothing instead of an
//! error. Reads and writes, by contrast, always report failures.

use std::fs::{self, DirEntry};
use std::path::Path;

use tracing::{debug, warn};

use crate::core::constants::ENTRY_SUFFIX;
use crate::core::types::EntryName;

/// Names of `.gpg` files directly under `root`.
pub fn entries(root: &Path) -> Vec<EntryName> {
    children(root)
        .into_iter()
        .filter(|(_, is_dir)| !is_dir)
        .map(|(name, _)| name)
        .filter(|name| name.ends_with(ENTRY_SUFFIX) && name.len() > ENTRY_SUFFIX.len())
        .collect()
}

/// Names of directories directly under `root`.
pub fn folders(root: &Path) -> Vec<String> {
    children(root)
        .into_iter()
        .filter(|(_, is_dir)| *is_dir)
        .map(|(name, _)| name)
        .collect()
}

fn children(root: &Path) -> Vec<(String, bool)> {
    let read_dir = match fs::read_dir(root) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "cannot list store");
            return Vec::new();
        }
    };

    let children: Vec<(String, bool)> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(describe(&entry)),
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .collect();

    debug!(path = %root.display(), children = children.len(), "listed store");
    children
}

fn describe(entry: &DirEntry) -> (String, bool) {
    let name = entry.file_name().to_string_lossy().into_owned();
    // Follow symlinks so a linked folder counts as a folder.
    let is_dir = fs::metadata(entry.path())
        .map(|m| m.is_dir())
        .unwrap_or(false);
    (name, is_dir)
}
