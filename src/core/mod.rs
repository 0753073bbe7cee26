//! Core library components.
//!
//! This module contains the store engine: keyrings and recipient filtering,
//! the age message protocol, key unlocking, and the store itself.

pub mod cipher;
pub mod constants;
pub mod keyring;
pub mod recipient;
pub mod store;
pub mod types;
pub mod unlock;
