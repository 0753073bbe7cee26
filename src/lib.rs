//! passgo - A multi-recipient encrypted password store.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Write the store's .gpg-id
//! │   ├── ls            # List entries and folders
//! │   ├── show          # Decrypt an entry to stdout
//! │   ├── insert        # Encrypt stdin or a prompt into an entry
//! │   ├── keys          # Generate and list keyring entities
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── keyring/      # Key entities, keyring file, recipient filter
//!     ├── recipient     # .gpg-id parsing
//!     ├── cipher/       # Read/encrypt protocol over age
//!     ├── unlock/       # Unlock capability and passphrase providers
//!     └── store/        # Read, write and list entries
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::io::Read;
//! use std::path::Path;
//!
//! use passgo::{KeyRing, PassphraseUnlock, Store, TerminalPrompt};
//!
//! # fn main() -> passgo::Result<()> {
//! let keyring = KeyRing::load(Path::new("keyring.toml"))?;
//! let store = Store::open("password-store", keyring, PassphraseUnlock::new(TerminalPrompt::new()))?;
//!
//! let mut secret = String::new();
//! store.read("email/work")?.read_to_string(&mut secret)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::keyring::{Candidate, Key, KeyEntity, KeyRing};
pub use crate::core::recipient::RecipientList;
pub use crate::core::store::{EntryReader, EntryWriter, Store};
pub use crate::core::unlock::{
    ChannelPassphrase, FixedPassphrase, PassphraseProvider, PassphraseUnlock, TerminalPrompt,
    Unlock, UnlockPolicy,
};
pub use crate::error::{Error, OpenError, Result};
