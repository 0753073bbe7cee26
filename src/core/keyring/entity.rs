//! Key entities.
//!
//! A [`KeyEntity`] is one primary age key plus optional subkeys, labelled by
//! one or more identities. Each [`Key`] may carry private material, either
//! plain or locked behind a passphrase.

use std::fmt;
use std::sync::OnceLock;

use age::secrecy::{ExposeSecret, SecretString};
use age::x25519;
use tracing::debug;

use crate::core::cipher;
use crate::core::types::{IdentityName, PublicKey};
use crate::error::{Error, Result};

/// Private half of a key.
#[derive(Clone)]
pub(crate) enum Secret {
    Plain(x25519::Identity),
    Locked(LockedSecret),
}

/// A passphrase-locked secret key.
///
/// The unlocked identity is cached, so a key is unlocked at most once.
#[derive(Clone)]
pub(crate) struct LockedSecret {
    armored: String,
    unlocked: OnceLock<x25519::Identity>,
}

impl LockedSecret {
    pub(crate) fn new(armored: String) -> Self {
        Self {
            armored,
            unlocked: OnceLock::new(),
        }
    }

    pub(crate) fn armored(&self) -> &str {
        &self.armored
    }
}

/// One age key: a public recipient and, optionally, its secret.
#[derive(Clone)]
pub struct Key {
    public: x25519::Recipient,
    encrypt: bool,
    secret: Option<Secret>,
}

impl Key {
    pub(crate) fn from_parts(
        public: x25519::Recipient,
        encrypt: bool,
        secret: Option<Secret>,
    ) -> Self {
        Self {
            public,
            encrypt,
            secret,
        }
    }

    /// A public-only key, as imported from another person.
    pub fn public_only(public: x25519::Recipient) -> Self {
        Self::from_parts(public, true, None)
    }

    /// Generate a fresh key pair.
    ///
    /// With a passphrase the secret is stored locked and must be unlocked
    /// before it can decrypt anything.
    pub fn generate(passphrase: Option<&SecretString>) -> Result<Self> {
        let identity = x25519::Identity::generate();
        let public = identity.to_public();

        let secret = match passphrase {
            Some(passphrase) => {
                let armored = cipher::lock_secret(&identity, passphrase)?;
                Secret::Locked(LockedSecret::new(armored))
            }
            None => Secret::Plain(identity),
        };

        Ok(Self::from_parts(public, true, Some(secret)))
    }

    /// The age recipient for this key.
    pub fn public(&self) -> &x25519::Recipient {
        &self.public
    }

    /// The public key as an `age1...` string.
    pub fn public_key(&self) -> PublicKey {
        self.public.to_string()
    }

    /// Whether entries may be encrypted to this key.
    pub fn can_encrypt(&self) -> bool {
        self.encrypt
    }

    /// Mark the key as usable (or not) for encryption.
    pub fn set_encrypt(&mut self, encrypt: bool) {
        self.encrypt = encrypt;
    }

    /// Whether any private material is attached.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Whether the secret is locked and has not been unlocked yet.
    pub fn is_locked(&self) -> bool {
        matches!(&self.secret, Some(Secret::Locked(l)) if l.unlocked.get().is_none())
    }

    /// Whether the secret was stored behind a passphrase, unlocked or not.
    pub fn is_passphrase_protected(&self) -> bool {
        matches!(self.secret, Some(Secret::Locked(_)))
    }

    /// The identity usable for decryption right now, if any.
    pub fn identity(&self) -> Option<&x25519::Identity> {
        match self.secret.as_ref()? {
            Secret::Plain(identity) => Some(identity),
            Secret::Locked(locked) => locked.unlocked.get(),
        }
    }

    /// Unlock a passphrase-protected secret.
    ///
    /// Keys that are plain, public-only or already unlocked succeed
    /// without touching the passphrase.
    pub fn unlock(&self, passphrase: &SecretString) -> Result<()> {
        let Some(Secret::Locked(locked)) = &self.secret else {
            return Ok(());
        };
        if locked.unlocked.get().is_some() {
            return Ok(());
        }

        let identity = cipher::unlock_secret(&locked.armored, passphrase)?;
        if identity.to_public().to_string() != self.public.to_string() {
            return Err(Error::Format(format!(
                "locked secret does not belong to public key {}",
                self.public
            )));
        }

        debug!(public_key = %self.public, "key unlocked");
        let _ = locked.unlocked.set(identity);
        Ok(())
    }

    pub(crate) fn secret(&self) -> Option<&Secret> {
        self.secret.as_ref()
    }

    /// Expose a plain secret as its `AGE-SECRET-KEY-...` string.
    pub(crate) fn plain_secret_string(&self) -> Option<String> {
        match self.secret.as_ref()? {
            Secret::Plain(identity) => Some(identity.to_string().expose_secret().to_string()),
            Secret::Locked(_) => None,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = match &self.secret {
            None => "none",
            Some(Secret::Plain(_)) => "plain",
            Some(Secret::Locked(l)) if l.unlocked.get().is_some() => "unlocked",
            Some(Secret::Locked(_)) => "locked",
        };
        f.debug_struct("Key")
            .field("public", &self.public.to_string())
            .field("encrypt", &self.encrypt)
            .field("secret", &secret)
            .finish()
    }
}

/// A key holder: primary key, subkeys and the identities naming them.
#[derive(Debug, Clone)]
pub struct KeyEntity {
    identities: Vec<IdentityName>,
    primary: Key,
    subkeys: Vec<Key>,
}

impl KeyEntity {
    /// Create an entity, requiring at least one identity.
    pub fn new(identities: Vec<IdentityName>, primary: Key) -> Result<Self> {
        if identities.is_empty() {
            return Err(Error::Format(format!(
                "key {} has no identities",
                primary.public_key()
            )));
        }
        if let Some(blank) = identities.iter().find(|i| i.trim().is_empty()) {
            return Err(Error::Format(format!(
                "key {} has a blank identity '{}'",
                primary.public_key(),
                blank
            )));
        }
        Ok(Self {
            identities,
            primary,
            subkeys: Vec::new(),
        })
    }

    /// Generate an entity with a fresh primary key.
    pub fn generate(identities: Vec<IdentityName>, passphrase: Option<&SecretString>) -> Result<Self> {
        Self::new(identities, Key::generate(passphrase)?)
    }

    /// Attach an existing subkey.
    pub fn with_subkey(mut self, key: Key) -> Self {
        self.subkeys.push(key);
        self
    }

    /// Generate and attach a new subkey, returning it.
    pub fn add_subkey(&mut self, passphrase: Option<&SecretString>) -> Result<&Key> {
        self.subkeys.push(Key::generate(passphrase)?);
        Ok(&self.subkeys[self.subkeys.len() - 1])
    }

    pub fn identities(&self) -> &[IdentityName] {
        &self.identities
    }

    /// First identity, used in prompts and listings.
    pub fn label(&self) -> &str {
        &self.identities[0]
    }

    pub fn primary(&self) -> &Key {
        &self.primary
    }

    pub fn subkeys(&self) -> &[Key] {
        &self.subkeys
    }

    /// Primary key followed by subkeys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        std::iter::once(&self.primary).chain(self.subkeys.iter())
    }

    /// Whether `name` is one of this entity's identities.
    pub fn has_identity(&self, name: &str) -> bool {
        !name.is_empty() && self.identities.iter().any(|i| i == name)
    }

    /// The key entries for this entity are encrypted to.
    ///
    /// The most recently added encryption-capable subkey wins; the primary
    /// key is used only when no subkey qualifies.
    pub fn encryption_key(&self) -> Option<&Key> {
        self.subkeys
            .iter()
            .rev()
            .find(|k| k.can_encrypt())
            .or_else(|| Some(&self.primary).filter(|k| k.can_encrypt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passphrase(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_entity_requires_identity() {
        let key = Key::generate(None).unwrap();
        assert!(KeyEntity::new(vec![], key.clone()).is_err());
        assert!(KeyEntity::new(vec!["  ".to_string()], key).is_err());
    }

    #[test]
    fn test_has_identity_ignores_empty_name() {
        let entity = KeyEntity::generate(vec!["alice".to_string()], None).unwrap();
        assert!(entity.has_identity("alice"));
        assert!(!entity.has_identity(""));
        assert!(!entity.has_identity("bob"));
    }

    #[test]
    fn test_encryption_key_prefers_newest_subkey() {
        let mut entity = KeyEntity::generate(vec!["alice".to_string()], None).unwrap();
        entity.add_subkey(None).unwrap();
        let newest = entity.add_subkey(None).unwrap().public_key();

        assert_eq!(entity.encryption_key().unwrap().public_key(), newest);
    }

    #[test]
    fn test_encryption_key_skips_disabled_keys() {
        let mut primary = Key::generate(None).unwrap();
        primary.set_encrypt(false);
        let entity = KeyEntity::new(vec!["alice".to_string()], primary).unwrap();
        assert!(entity.encryption_key().is_none());

        let mut sub = Key::generate(None).unwrap();
        sub.set_encrypt(false);
        let entity = entity.with_subkey(sub);
        assert!(entity.encryption_key().is_none());
    }

    #[test]
    fn test_locked_key_unlocks_with_right_passphrase() {
        let key = Key::generate(Some(&passphrase("hunter2"))).unwrap();
        assert!(key.is_locked());
        assert!(key.identity().is_none());

        assert!(key.unlock(&passphrase("wrong")).is_err());
        assert!(key.is_locked());

        key.unlock(&passphrase("hunter2")).unwrap();
        assert!(!key.is_locked());
        assert!(key.is_passphrase_protected());
        assert_eq!(
            key.identity().unwrap().to_public().to_string(),
            key.public_key()
        );
    }

    #[test]
    fn test_plain_key_is_never_locked() {
        let key = Key::generate(None).unwrap();
        assert!(!key.is_locked());
        assert!(key.identity().is_some());
        key.unlock(&passphrase("anything")).unwrap();
    }
}
