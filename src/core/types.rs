//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A human-readable label bound to a key entity (e.g. `alice@example.com`).
pub type IdentityName = String;

/// The name of an entry relative to the store root, with or without `.gpg`.
pub type EntryName = String;

/// An age public key string (starts with "age1...").
pub type PublicKey = String;
