//! Message protocol over the age engine.
//!
//! Two operations are consumed by the store:
//!
//! - [`read_message`]: decrypt an entry with the store's keyring, asking the
//!   unlock capability for locked keys when nothing else works.
//! - [`encrypt_message`]: stream plaintext into an armored age message for a
//!   set of recipient keys.
//!
//! age x25519 stanzas carry no recipient hints, so every private key in the
//! keyring is a decryption candidate.

use std::io::{Read, Seek, Write};

use tracing::debug;

mod age;

pub use self::age::{MessageReader, MessageWriter};
pub(crate) use self::age::{lock_secret, unlock_secret};

use crate::core::keyring::{Candidate, Key, KeyRing};
use crate::core::unlock::Unlock;
use crate::error::{Error, Result};

/// Decrypt a message from `source` using keys from `keyring`.
///
/// Keys that are already usable are tried first. If none of them is a
/// recipient, `unlock` is called exactly once with every still-locked
/// candidate, then decryption is retried with everything usable.
///
/// # Errors
///
/// - `Error::Format` if `source` is not an age message
/// - `Error::Decryption` if the keyring has no private keys, nothing
///   unlocks, or no usable key is a recipient
/// - whatever the unlock capability returns
pub fn read_message<R: Read + Seek>(
    mut source: R,
    keyring: &KeyRing,
    unlock: &dyn Unlock,
) -> Result<MessageReader<R>> {
    let candidates = keyring.candidates();

    let usable = usable_identities(&candidates);
    let matched = self::age::probe(&mut source, &usable)?;

    if candidates.is_empty() {
        return Err(Error::Decryption(
            "no private key is available for this store".to_string(),
        ));
    }

    if !matched {
        let locked: Vec<Candidate<'_>> = candidates
            .iter()
            .copied()
            .filter(|c| c.key.is_locked())
            .collect();

        if locked.is_empty() {
            return Err(Error::Decryption(
                "no available private key is a recipient of this entry".to_string(),
            ));
        }

        debug!(candidates = locked.len(), "requesting key unlock");
        unlock.unlock(&locked)?;
    }

    source.rewind()?;
    let usable = usable_identities(&candidates);
    if usable.is_empty() {
        return Err(Error::Decryption("no private key could be unlocked".to_string()));
    }
    self::age::decrypt_with(source, &usable)
}

/// Start an encrypted message to `recipients` on top of `sink`.
///
/// Closing the message is the caller's job: finish the returned writer and
/// then the armor writer it yields.
pub fn encrypt_message<W: Write>(sink: W, recipients: &[&Key]) -> Result<MessageWriter<W>> {
    if recipients.is_empty() {
        return Err(Error::NoRecipient);
    }
    let publics: Vec<_> = recipients.iter().map(|k| k.public()).collect();
    self::age::encrypt_to(sink, &publics)
}

fn usable_identities<'a>(candidates: &[Candidate<'a>]) -> Vec<&'a ::age::x25519::Identity> {
    candidates.iter().filter_map(|c| c.key.identity()).collect()
}
