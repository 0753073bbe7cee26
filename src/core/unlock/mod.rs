//! Private key unlocking.
//!
//! A [`Store`](crate::core::store::Store) holds one [`Unlock`] capability.
//! The message reader hands it every locked key that could decrypt the
//! entry being read, in a single call.
//!
//! [`PassphraseUnlock`] is the standard capability: it asks a
//! [`PassphraseProvider`] for one passphrase and tries it on each candidate.

use tracing::{debug, warn};

mod prompt;

pub use prompt::{ChannelPassphrase, FixedPassphrase, PassphraseProvider, TerminalPrompt};

pub use crate::core::keyring::Candidate;
use crate::error::{Error, Result};

/// Capability that turns locked candidate keys into usable ones.
pub trait Unlock: Send + Sync {
    /// Try to unlock `candidates`.
    ///
    /// Called at most once per read, with every locked candidate.
    ///
    /// # Errors
    ///
    /// Implementations return an error when their policy is not met; the
    /// read then fails with that error.
    fn unlock(&self, candidates: &[Candidate<'_>]) -> Result<()>;
}

/// How many candidates must unlock for the attempt to count as success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnlockPolicy {
    /// At least one candidate must unlock.
    #[default]
    AnyOf,
    /// Every candidate must unlock.
    AllOf,
}

/// Unlock with a single passphrase applied to every candidate.
#[derive(Debug)]
pub struct PassphraseUnlock<P> {
    provider: P,
    policy: UnlockPolicy,
}

impl<P: PassphraseProvider> PassphraseUnlock<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            policy: UnlockPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnlockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnlockPolicy {
        self.policy
    }

    fn prompt(candidates: &[Candidate<'_>]) -> String {
        let mut names: Vec<&str> = candidates.iter().map(|c| c.entity.label()).collect();
        names.dedup();
        format!("Passphrase for {}", names.join(", "))
    }
}

impl<P: PassphraseProvider> Unlock for PassphraseUnlock<P> {
    fn unlock(&self, candidates: &[Candidate<'_>]) -> Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }

        let passphrase = self.provider.passphrase(&Self::prompt(candidates))?;

        let mut unlocked = 0;
        let mut last_error = None;
        for candidate in candidates {
            match candidate.key.unlock(&passphrase) {
                Ok(()) => unlocked += 1,
                Err(e) => {
                    debug!(identity = candidate.entity.label(), "key did not unlock");
                    if self.policy == UnlockPolicy::AllOf {
                        return Err(e);
                    }
                    last_error = Some(e);
                }
            }
        }

        debug!(unlocked, candidates = candidates.len(), "unlock attempt finished");

        match last_error {
            Some(e) if unlocked == 0 => {
                warn!("passphrase unlocked none of the candidate keys");
                Err(e)
            }
            _ if unlocked == 0 => Err(Error::Decryption("no key was unlocked".to_string())),
            _ => Ok(()),
        }
    }
}
