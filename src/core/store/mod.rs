//! The password store.
//!
//! A [`Store`] binds a root directory, the keyring filtered to the root's
//! `.gpg-id` recipient list, and an [`Unlock`] capability. Entries are plain
//! files named `<name>.gpg`; the store keeps no index.
//!
//! ## Failure policy
//!
//! [`Store::read`] and [`Store::write`] fail hard and report every error.
//! [`Store::list`] and [`Store::sub_folders`] fail soft and return an empty
//! list when the root cannot be read.
//!
//! ## Concurrency
//!
//! Reads may run concurrently. Writes take no locks: two writers on the same
//! entry, in one process or several, can tear the ciphertext.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

mod entry;
mod fs;

pub use entry::{normalize, EntryWriter};

use crate::core::cipher::{self, MessageReader};
use crate::core::keyring::KeyRing;
use crate::core::recipient::RecipientList;
use crate::core::types::EntryName;
use crate::core::unlock::Unlock;
use crate::error::{Error, OpenError, Result};

/// Decrypted contents of an entry, read as a stream.
pub type EntryReader = MessageReader<File>;

/// A password store rooted at a directory.
pub struct Store {
    root: PathBuf,
    keyring: KeyRing,
    recipients: RecipientList,
    unlock: Box<dyn Unlock>,
}

impl Store {
    /// Open the store at `root`.
    ///
    /// Reads `<root>/.gpg-id` and keeps only the keyring entities named in
    /// it. The filtered keyring is fixed for the life of the store; later
    /// edits to `.gpg-id` are not picked up.
    ///
    /// # Errors
    ///
    /// If the recipient list cannot be read, returns an [`OpenError`] that
    /// still carries a store holding the *unfiltered* keyring. That store is
    /// only a record of the partial result: the error is fatal and the store
    /// must not be used.
    pub fn open<U>(root: impl Into<PathBuf>, keyring: KeyRing, unlock: U) -> std::result::Result<Self, OpenError>
    where
        U: Unlock + 'static,
    {
        let root = root.into();
        debug!(root = %root.display(), "opening store");

        let mut store = Self {
            root,
            keyring,
            recipients: RecipientList::default(),
            unlock: Box::new(unlock),
        };

        match RecipientList::load(&store.root) {
            Ok(recipients) => {
                store.keyring = store.keyring.filter(recipients.names());
                store.recipients = recipients;
                debug!(
                    recipients = store.recipients.len(),
                    keys = store.keyring.len(),
                    "store opened"
                );
                Ok(store)
            }
            Err(e) => Err(OpenError::new(e, store)),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keyring entities allowed to read and write this store.
    pub fn keyring(&self) -> &KeyRing {
        &self.keyring
    }

    /// Identities listed in `.gpg-id` when the store was opened.
    pub fn recipients(&self) -> &RecipientList {
        &self.recipients
    }

    /// Whether `name` exists as an entry.
    pub fn contains(&self, name: &str) -> bool {
        entry::resolve(&self.root, name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Decrypt an entry.
    ///
    /// `.gpg` is appended to `name` when missing. Locked keys are unlocked
    /// through the store's capability only if no usable key decrypts the
    /// entry. Signatures are never checked.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the entry does not exist
    /// - `Error::Format` if the file is not an encrypted entry
    /// - `Error::Decryption` if no key in the store can decrypt it
    ///
    /// Only the header is checked here. Corruption in the body surfaces as
    /// an `io::Error` of kind `InvalidData` while the returned reader is
    /// read.
    pub fn read(&self, name: &str) -> Result<EntryReader> {
        let path = entry::resolve(&self.root, name)?;
        debug!(entry = %normalize(name), "reading entry");

        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(normalize(name)),
            _ => Error::at(&path, e),
        })?;

        cipher::read_message(file, &self.keyring, self.unlock.as_ref())
    }

    /// Open an entry for writing.
    ///
    /// The returned writer encrypts to the encryption key of every entity in
    /// the store's keyring. Ciphertext is staged in a hidden sibling file
    /// and replaces the entry only when [`EntryWriter::finish`] succeeds, so
    /// an abandoned writer leaves the previous value readable. Parent
    /// folders must already exist.
    ///
    /// # Errors
    ///
    /// - `Error::NoRecipient` if no entity can receive entries; the file is
    ///   not touched in that case
    /// - `Error::Path` if the staging file cannot be created
    pub fn write(&self, name: &str) -> Result<EntryWriter> {
        let path = entry::resolve(&self.root, name)?;

        let recipients = self.keyring.encryption_keys();
        if recipients.is_empty() {
            return Err(Error::NoRecipient);
        }
        debug!(
            entry = %normalize(name),
            recipients = recipients.len(),
            "writing entry"
        );

        let staging = entry::staging_path(&path);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)
            .map_err(|e| Error::at(&staging, e))?;

        match cipher::encrypt_message(BufWriter::new(file), &recipients) {
            Ok(stream) => Ok(EntryWriter::new(stream, path, staging)),
            Err(e) => {
                let _ = std::fs::remove_file(&staging);
                Err(e)
            }
        }
    }

    /// Entry names (with `.gpg`) directly under the root, unordered.
    pub fn list(&self) -> Vec<EntryName> {
        fs::entries(&self.root)
    }

    /// Folder names directly under the root, unordered.
    ///
    /// Browsing deeper is left to the caller.
    pub fn sub_folders(&self) -> Vec<String> {
        fs::folders(&self.root)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("keyring", &self.keyring)
            .field("recipients", &self.recipients)
            .finish_non_exhaustive()
    }
}
