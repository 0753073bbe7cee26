use std::path::PathBuf;

use thiserror::Error;

use crate::core::store::Store;

#[derive(Error, Debug)]
pub enum Error {
    #[error("entry not found: {0}")]
    NotFound(String),

    #[error("entry already exists: {0} (use --force to overwrite)")]
    EntryExists(String),

    #[error("no key in the keyring for {0}")]
    UnknownIdentity(String),

    #[error("no recipient in this store can receive encrypted entries")]
    NoRecipient,

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid format: {0}")]
    Format(String),

    #[error("invalid entry name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("passphrase prompt failed: {0}")]
    Prompt(String),

    #[error("io error at {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the path an I/O error happened on.
    pub(crate) fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is the store's "no such entry" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to read the store's `.gpg-id` control file.
///
/// Opening a store still produces a [`Store`] in this case, holding the
/// *unfiltered* keyring that was passed in. It is carried here only so the
/// partial result stays observable; treat the error as fatal and do not use
/// the store for reads or writes.
#[derive(Error, Debug)]
#[error("cannot read recipient list: {source}")]
pub struct OpenError {
    #[source]
    pub source: Error,
    store: Box<Store>,
}

impl OpenError {
    pub(crate) fn new(source: Error, store: Store) -> Self {
        Self {
            source,
            store: Box::new(store),
        }
    }

    /// The store built before the failure, with the unfiltered keyring.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Take the unfiltered store out of the error.
    pub fn into_store(self) -> Store {
        *self.store
    }
}

impl From<OpenError> for Error {
    fn from(err: OpenError) -> Self {
        err.source
    }
}
