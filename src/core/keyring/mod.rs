//! Keyring loading and recipient filtering.
//!
//! A [`KeyRing`] is an ordered list of [`KeyEntity`] values, kept in load
//! order with no deduplication. Stores narrow it with [`KeyRing::filter`]
//! to the entities named in their recipient list.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

mod entity;
mod file;

pub use entity::{Key, KeyEntity};

use crate::error::{Error, Result};
use file::{EntityRecord, KeyRingFile};

/// A private key candidate for decryption, with the entity that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub entity: &'a KeyEntity,
    pub key: &'a Key,
}

/// An ordered collection of key entities.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    entities: Vec<KeyEntity>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a keyring file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Path` if the file cannot be read and
    /// `Error::Format` if its contents are malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading keyring");

        #[cfg(unix)]
        warn_if_readable_by_others(path);

        let contents = fs::read_to_string(path).map_err(|e| Error::at(path, e))?;
        let ring = Self::parse(&contents)?;

        debug!(entities = ring.len(), "keyring loaded");
        Ok(ring)
    }

    /// Parse keyring contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: KeyRingFile =
            toml::from_str(contents).map_err(|e| Error::Format(format!("keyring: {}", e)))?;

        let entities = file
            .entities
            .into_iter()
            .map(EntityRecord::into_entity)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entities })
    }

    /// Serialize to the keyring file format.
    pub fn to_toml(&self) -> Result<String> {
        let file = KeyRingFile {
            entities: self.entities.iter().map(EntityRecord::from_entity).collect(),
        };
        Ok(toml::to_string(&file)?)
    }

    /// Write the keyring, restricting permissions to the owner on Unix.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::at(parent, e))?;
        }

        fs::write(path, self.to_toml()?).map_err(|e| Error::at(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .map_err(|e| Error::at(path, e))?;
        }

        debug!(path = %path.display(), entities = self.len(), "keyring saved");
        Ok(())
    }

    pub fn push(&mut self, entity: KeyEntity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[KeyEntity] {
        &self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyEntity> {
        self.entities.iter()
    }

    /// First entity carrying `identity`.
    pub fn find(&self, identity: &str) -> Option<&KeyEntity> {
        self.entities.iter().find(|e| e.has_identity(identity))
    }

    pub fn find_mut(&mut self, identity: &str) -> Option<&mut KeyEntity> {
        self.entities.iter_mut().find(|e| e.has_identity(identity))
    }

    /// Keep the entities whose identities intersect `names`.
    ///
    /// Order is preserved and an entity appears once even when it matches
    /// several names. Empty names never match. Entities matching nothing are
    /// dropped without error.
    pub fn filter<S: AsRef<str>>(&self, names: &[S]) -> KeyRing {
        let entities: Vec<KeyEntity> = self
            .entities
            .iter()
            .filter(|e| names.iter().any(|n| e.has_identity(n.as_ref())))
            .cloned()
            .collect();

        debug!(
            before = self.entities.len(),
            after = entities.len(),
            "filtered keyring"
        );
        KeyRing { entities }
    }

    /// Every key holding private material, plain or locked.
    pub fn candidates(&self) -> Vec<Candidate<'_>> {
        self.entities
            .iter()
            .flat_map(|entity| {
                entity
                    .keys()
                    .filter(|key| key.has_secret())
                    .map(move |key| Candidate { entity, key })
            })
            .collect()
    }

    /// The encryption key of each entity that has one.
    pub fn encryption_keys(&self) -> Vec<&Key> {
        self.entities
            .iter()
            .filter_map(KeyEntity::encryption_key)
            .collect()
    }
}

impl From<Vec<KeyEntity>> for KeyRing {
    fn from(entities: Vec<KeyEntity>) -> Self {
        Self { entities }
    }
}

impl<'a> IntoIterator for &'a KeyRing {
    type Item = &'a KeyEntity;
    type IntoIter = std::slice::Iter<'a, KeyEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

#[cfg(unix)]
fn warn_if_readable_by_others(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode),
                "insecure keyring file permissions"
            );
        }
    }
}
