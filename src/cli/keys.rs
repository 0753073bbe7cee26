//! Keys commands.
//!
//! Generate key entities, add subkeys, and list the keyring.

use tracing::info;

use crate::cli::{output, Context};
use crate::core::keyring::{Key, KeyEntity};
use crate::error::{Error, Result};

/// Generate a new entity and append it to the keyring file.
pub fn generate(ctx: &Context, identities: Vec<String>, no_passphrase: bool) -> Result<()> {
    info!("Generating key for {}", identities.join(", "));

    let mut keyring = ctx.load_keyring_or_default()?;

    let passphrase = if no_passphrase {
        None
    } else {
        Some(ctx.new_key_passphrase(&identities[0])?)
    };

    let entity = KeyEntity::generate(identities, passphrase.as_ref())?;
    let public_key = entity.primary().public_key();
    let label = entity.label().to_string();

    keyring.push(entity);
    keyring.save(ctx.keyring_path())?;

    output::success(&format!("generated key for {}", label));
    output::data(&public_key);
    Ok(())
}

/// Add an encryption subkey to an existing entity.
pub fn subkey(ctx: &Context, identity: &str, no_passphrase: bool) -> Result<()> {
    info!("Adding subkey for {}", identity);

    let mut keyring = ctx.load_keyring()?;
    let entity = keyring
        .find_mut(identity)
        .ok_or_else(|| Error::UnknownIdentity(identity.to_string()))?;

    let passphrase = if no_passphrase {
        None
    } else {
        Some(ctx.new_key_passphrase(identity)?)
    };

    let public_key = entity.add_subkey(passphrase.as_ref())?.public_key();

    keyring.save(ctx.keyring_path())?;

    output::success(&format!("added subkey for {}", identity));
    output::data(&public_key);
    Ok(())
}

/// List keyring entities.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let keyring = ctx.load_keyring()?;

    if json {
        let entities: Vec<_> = keyring
            .iter()
            .map(|e| {
                serde_json::json!({
                    "identities": e.identities(),
                    "keys": e.keys().map(describe_json).collect::<Vec<_>>(),
                })
            })
            .collect();
        let result = serde_json::json!({
            "entities": entities,
            "count": keyring.len(),
        });
        output::data(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if keyring.is_empty() {
        output::dimmed("keyring is empty");
        return Ok(());
    }

    output::header(&format!("{} key entities", keyring.len()));
    output::rule();
    for entity in &keyring {
        output::kv("identities", entity.identities().join(", "));
        for key in entity.keys() {
            output::list_item(&format!("{} ({})", key.public_key(), secret_state(key)));
        }
    }
    Ok(())
}

fn describe_json(key: &Key) -> serde_json::Value {
    serde_json::json!({
        "public_key": key.public_key(),
        "encrypt": key.can_encrypt(),
        "secret": secret_state(key),
    })
}

fn secret_state(key: &Key) -> &'static str {
    if !key.has_secret() {
        "public only"
    } else if key.is_passphrase_protected() {
        "locked"
    } else {
        "plain"
    }
}
