//! Test support utilities for passgo integration tests.
//!
//! Provides isolated store directories, keyring fixtures and CLI helpers.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::Output;

use age::secrecy::SecretString;
use assert_cmd::Command;
use passgo::{FixedPassphrase, KeyEntity, KeyRing, PassphraseUnlock, Store};
use tempfile::TempDir;

/// Passphrase used for every locked key in the fixtures.
pub const PASSPHRASE: &str = "correct horse battery staple";

/// Isolated keyring file and store root.
///
/// Each test gets its own temporary directory; nothing global is touched,
/// so tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Empty directory, no keyring, no store.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Store root with `.gpg-id` listing `recipients`.
    pub fn with_recipients(recipients: &[&str]) -> Self {
        let t = Self::new();
        std::fs::create_dir_all(t.root()).unwrap();
        std::fs::write(t.root().join(".gpg-id"), recipients.join("\n")).unwrap();
        t
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn keyring_path(&self) -> PathBuf {
        self.dir.path().join("keyring.toml")
    }

    /// Open the store over `keyring` with a fixed-passphrase unlock.
    pub fn open(&self, keyring: KeyRing) -> Store {
        Store::open(self.root(), keyring, unlock()).expect("failed to open store")
    }

    /// A `passgo` command pointed at this test's keyring and store.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("passgo").expect("failed to find passgo binary");
        cmd.env("PASSGO_KEYRING", self.keyring_path());
        cmd.env("PASSGO_STORE", self.root());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("PASSGO_PASSPHRASE");
        cmd.env_remove("PASSGO_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run passgo")
    }
}

pub fn unlock() -> PassphraseUnlock<FixedPassphrase> {
    PassphraseUnlock::new(FixedPassphrase::new(PASSPHRASE))
}

/// Entity with a plain secret key.
pub fn plain(name: &str) -> KeyEntity {
    KeyEntity::generate(vec![name.to_string()], None).unwrap()
}

/// Entity whose secret key is locked with [`PASSPHRASE`].
pub fn locked(name: &str) -> KeyEntity {
    locked_with(name, PASSPHRASE)
}

pub fn locked_with(name: &str, passphrase: &str) -> KeyEntity {
    let pass = SecretString::from(passphrase.to_string());
    KeyEntity::generate(vec![name.to_string()], Some(&pass)).unwrap()
}

/// Keep only the public halves of `ring`, as another person would see it.
pub fn public_view(ring: &KeyRing) -> KeyRing {
    KeyRing::from(
        ring.iter()
            .map(|e| {
                let mut public = KeyEntity::new(
                    e.identities().to_vec(),
                    passgo::Key::public_only(e.primary().public().clone()),
                )
                .unwrap();
                for sub in e.subkeys() {
                    public = public.with_subkey(passgo::Key::public_only(sub.public().clone()));
                }
                public
            })
            .collect::<Vec<_>>(),
    )
}

pub fn write_entry(store: &Store, name: &str, value: &[u8]) {
    let mut w = store.write(name).expect("failed to open entry for writing");
    w.write_all(value).unwrap();
    w.finish().expect("failed to finish entry");
}

pub fn read_entry(store: &Store, name: &str) -> passgo::Result<Vec<u8>> {
    let mut reader = store.read(name)?;
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

pub fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

/// Assert that a command output was successful.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("Command failed:\n{}", stderr);
    }
}

/// Get stdout as String.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Get stderr as String.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
