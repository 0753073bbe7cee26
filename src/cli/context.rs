//! Resolved command context: where the keyring and store live, and how
//! passphrases are obtained.

use std::path::{Path, PathBuf};

use age::secrecy::SecretString;
use tracing::debug;

use crate::core::constants::PASSPHRASE_ENV;
use crate::core::keyring::KeyRing;
use crate::core::store::Store;
use crate::core::unlock::{
    FixedPassphrase, PassphraseProvider, PassphraseUnlock, TerminalPrompt,
};
use crate::error::Result;

/// Paths shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub keyring: PathBuf,
    pub store: PathBuf,
}

impl Context {
    pub fn new(keyring: PathBuf, store: PathBuf) -> Self {
        Self { keyring, store }
    }

    pub fn keyring_path(&self) -> &Path {
        &self.keyring
    }

    pub fn store_root(&self) -> &Path {
        &self.store
    }

    /// Load the keyring file.
    pub fn load_keyring(&self) -> Result<KeyRing> {
        KeyRing::load(&self.keyring)
    }

    /// Load the keyring, or start an empty one if the file does not exist.
    pub fn load_keyring_or_default(&self) -> Result<KeyRing> {
        if self.keyring.exists() {
            self.load_keyring()
        } else {
            debug!(path = %self.keyring.display(), "keyring not found, starting empty");
            Ok(KeyRing::new())
        }
    }

    /// Open the store with the keyring and the configured unlock capability.
    pub fn open_store(&self) -> Result<Store> {
        let keyring = self.load_keyring()?;
        Ok(Store::open(&self.store, keyring, PassphraseUnlock::new(passphrase_source(false)))?)
    }

    /// Ask for a passphrase to protect a new key.
    pub fn new_key_passphrase(&self, identity: &str) -> Result<SecretString> {
        passphrase_source(true).passphrase(&format!("New passphrase for {}", identity))
    }
}

/// `PASSGO_PASSPHRASE` when set, otherwise the terminal.
fn passphrase_source(confirm: bool) -> Box<dyn PassphraseProvider> {
    match FixedPassphrase::from_env(PASSPHRASE_ENV) {
        Some(fixed) => {
            debug!("using passphrase from environment");
            Box::new(fixed)
        }
        None if confirm => Box::new(TerminalPrompt::confirmed()),
        None => Box::new(TerminalPrompt::new()),
    }
}
