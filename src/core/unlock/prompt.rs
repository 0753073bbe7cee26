//! Passphrase sources.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use age::secrecy::{ExposeSecret, SecretString};
use dialoguer::Password;

use crate::error::{Error, Result};

/// Something that can produce a passphrase on request.
pub trait PassphraseProvider: Send + Sync {
    /// Return a passphrase, using `prompt` to describe what it is for.
    fn passphrase(&self, prompt: &str) -> Result<SecretString>;
}

impl<P: PassphraseProvider + ?Sized> PassphraseProvider for Box<P> {
    fn passphrase(&self, prompt: &str) -> Result<SecretString> {
        (**self).passphrase(prompt)
    }
}

/// Hidden input on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt {
    confirm: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask twice and require both answers to match.
    pub fn confirmed() -> Self {
        Self { confirm: true }
    }
}

impl PassphraseProvider for TerminalPrompt {
    fn passphrase(&self, prompt: &str) -> Result<SecretString> {
        let mut input = Password::new().with_prompt(prompt);
        if self.confirm {
            input = input.with_confirmation("Repeat passphrase", "passphrases do not match");
        }
        let value = input.interact().map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(SecretString::from(value))
    }
}

/// A passphrase known up front, e.g. from an environment variable.
pub struct FixedPassphrase {
    value: SecretString,
}

impl FixedPassphrase {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: SecretString::from(value.into()),
        }
    }

    /// Read the passphrase from `var`, if set.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().map(Self::new)
    }
}

impl std::fmt::Debug for FixedPassphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FixedPassphrase(..)")
    }
}

impl PassphraseProvider for FixedPassphrase {
    fn passphrase(&self, _prompt: &str) -> Result<SecretString> {
        Ok(SecretString::from(self.value.expose_secret().to_string()))
    }
}

/// Passphrases fed through an in-memory channel, one per request.
///
/// A request with nothing queued blocks until a value is sent; a closed
/// channel is a prompt failure.
#[derive(Debug)]
pub struct ChannelPassphrase {
    rx: Mutex<Receiver<String>>,
}

impl ChannelPassphrase {
    pub fn new() -> (Sender<String>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx: Mutex::new(rx) })
    }
}

impl PassphraseProvider for ChannelPassphrase {
    fn passphrase(&self, _prompt: &str) -> Result<SecretString> {
        let rx = self
            .rx
            .lock()
            .map_err(|_| Error::Prompt("passphrase channel poisoned".to_string()))?;
        rx.recv()
            .map(SecretString::from)
            .map_err(|_| Error::Prompt("passphrase channel closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_passphrase_repeats() {
        let p = FixedPassphrase::new("pw");
        assert_eq!(p.passphrase("a").unwrap().expose_secret(), "pw");
        assert_eq!(p.passphrase("b").unwrap().expose_secret(), "pw");
    }

    #[test]
    fn test_channel_passphrase_in_order() {
        let (tx, p) = ChannelPassphrase::new();
        tx.send("one".to_string()).unwrap();
        tx.send("two".to_string()).unwrap();

        assert_eq!(p.passphrase("").unwrap().expose_secret(), "one");
        assert_eq!(p.passphrase("").unwrap().expose_secret(), "two");
    }

    #[test]
    fn test_channel_closed_is_prompt_error() {
        let (tx, p) = ChannelPassphrase::new();
        drop(tx);
        assert!(matches!(p.passphrase(""), Err(Error::Prompt(_))));
    }
}
