//! On-disk keyring format.
//!
//! ```toml
//! [[entity]]
//! identities = ["alice@example.com"]
//!
//! [entity.primary]
//! public = "age1..."
//! secret = "AGE-SECRET-KEY-1..."
//!
//! [[entity.subkeys]]
//! public = "age1..."
//! locked = "-----BEGIN AGE ENCRYPTED FILE-----\n..."
//! encrypt = true
//! ```

use age::x25519;
use serde::{Deserialize, Serialize};

use super::entity::{Key, KeyEntity, LockedSecret, Secret};
use crate::error::{Error, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct KeyRingFile {
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct EntityRecord {
    pub identities: Vec<String>,
    pub primary: KeyRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subkeys: Vec<KeyRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct KeyRecord {
    pub public: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<String>,
    #[serde(default = "default_encrypt")]
    pub encrypt: bool,
}

fn default_encrypt() -> bool {
    true
}

impl KeyRecord {
    fn into_key(self) -> Result<Key> {
        let public: x25519::Recipient = self
            .public
            .trim()
            .parse()
            .map_err(|e: &str| Error::Format(format!("invalid public key '{}': {}", self.public, e)))?;

        let secret = match (self.secret, self.locked) {
            (Some(_), Some(_)) => {
                return Err(Error::Format(format!(
                    "key {} has both a plain and a locked secret",
                    public
                )));
            }
            (Some(plain), None) => {
                let identity: x25519::Identity = plain
                    .trim()
                    .parse()
                    .map_err(|e: &str| Error::Format(format!("invalid secret for {}: {}", public, e)))?;
                if identity.to_public().to_string() != public.to_string() {
                    return Err(Error::Format(format!(
                        "secret does not match public key {}",
                        public
                    )));
                }
                Some(Secret::Plain(identity))
            }
            (None, Some(armored)) if armored.trim().is_empty() => {
                return Err(Error::Format(format!("key {} has an empty locked secret", public)));
            }
            (None, Some(armored)) => Some(Secret::Locked(LockedSecret::new(armored))),
            (None, None) => None,
        };

        Ok(Key::from_parts(public, self.encrypt, secret))
    }

    fn from_key(key: &Key) -> Self {
        let locked = match key.secret() {
            Some(Secret::Locked(locked)) => Some(locked.armored().to_string()),
            _ => None,
        };
        Self {
            public: key.public_key(),
            secret: key.plain_secret_string(),
            locked,
            encrypt: key.can_encrypt(),
        }
    }
}

impl EntityRecord {
    pub fn into_entity(self) -> Result<KeyEntity> {
        let mut entity = KeyEntity::new(self.identities, self.primary.into_key()?)?;
        for sub in self.subkeys {
            entity = entity.with_subkey(sub.into_key()?);
        }
        Ok(entity)
    }

    pub fn from_entity(entity: &KeyEntity) -> Self {
        Self {
            identities: entity.identities().to_vec(),
            primary: KeyRecord::from_key(entity.primary()),
            subkeys: entity.subkeys().iter().map(KeyRecord::from_key).collect(),
        }
    }
}
