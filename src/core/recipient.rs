//! Store recipient list (`.gpg-id`).
//!
//! One identity per line. Blank lines are kept as empty entries so the list
//! mirrors the file, but they never match a key.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::core::constants::RECIPIENTS_FILE;
use crate::core::types::IdentityName;
use crate::error::{Error, Result};

/// Ordered identities allowed to read and write a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList {
    names: Vec<IdentityName>,
}

impl RecipientList {
    pub fn new(names: Vec<IdentityName>) -> Self {
        Self { names }
    }

    /// Split file contents into lines.
    ///
    /// A final line without a trailing newline still counts; `\r\n` endings
    /// are accepted.
    pub fn parse(contents: &str) -> Self {
        Self {
            names: contents.lines().map(str::to_string).collect(),
        }
    }

    /// Read `.gpg-id` from a store root.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(RECIPIENTS_FILE);
        let contents = fs::read_to_string(&path).map_err(|e| Error::at(&path, e))?;
        let list = Self::parse(&contents);
        debug!(path = %path.display(), recipients = list.len(), "recipient list loaded");
        Ok(list)
    }

    /// Write `.gpg-id` into a store root, creating the root if needed.
    pub fn write(&self, root: &Path) -> Result<()> {
        fs::create_dir_all(root).map_err(|e| Error::at(root, e))?;
        let path = root.join(RECIPIENTS_FILE);
        let mut contents = self.names.join("\n");
        contents.push('\n');
        fs::write(&path, contents).map_err(|e| Error::at(&path, e))?;
        Ok(())
    }

    pub fn names(&self) -> &[IdentityName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
