//! Constants used throughout passgo.
//!
//! Centralizes magic strings and configuration values.

/// Recipient list file at the root of a store (.gpg-id).
pub const RECIPIENTS_FILE: &str = ".gpg-id";

/// Extension carried by every entry file, without the dot.
pub const ENTRY_EXTENSION: &str = "gpg";

/// Suffix appended to entry names that lack it.
pub const ENTRY_SUFFIX: &str = ".gpg";

/// Default keyring path when neither flag nor environment sets one.
pub const DEFAULT_KEYRING: &str = "./keyring.toml";

/// Default store root when neither flag nor environment sets one.
pub const DEFAULT_STORE: &str = "./password-store";

/// Environment variable naming the keyring file.
pub const KEYRING_ENV: &str = "PASSGO_KEYRING";

/// Environment variable naming the store root.
pub const STORE_ENV: &str = "PASSGO_STORE";

/// Environment variable holding a passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "PASSGO_PASSPHRASE";

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "PASSGO_LOG";
