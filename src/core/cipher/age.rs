//! Age encryption backend implementation.
//!
//! Wraps the age stream types used for entries (x25519 recipients, ASCII
//! armor on write, armor auto-detection on read) and the scrypt passphrase
//! encryption used to lock secret keys.

use std::io::{self, BufReader, Read, Write};

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::secrecy::{ExposeSecret, SecretString};
use age::stream::{StreamReader, StreamWriter};
use age::x25519;
use age::DecryptError;
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Decrypted view over an entry.
pub type MessageReader<R> = StreamReader<ArmoredReader<BufReader<R>>>;

/// Encrypting sink over an entry.
pub type MessageWriter<W> = StreamWriter<ArmoredWriter<W>>;

/// Start an armored age message to `recipients` on top of `sink`.
pub fn encrypt_to<W: Write>(sink: W, recipients: &[&x25519::Recipient]) -> Result<MessageWriter<W>> {
    trace!(recipients = recipients.len(), "encrypting");

    let encryptor =
        age::Encryptor::with_recipients(recipients.iter().map(|r| *r as &dyn age::Recipient))
            .map_err(|e| Error::Encryption(e.to_string()))?;

    let armored = ArmoredWriter::wrap_output(sink, Format::AsciiArmor)?;
    encryptor
        .wrap_output(armored)
        .map_err(|e| Error::Encryption(e.to_string()))
}

/// Parse the header of a message and try `identities` against it.
///
/// Returns `Ok(false)` when the header is valid but none of the identities
/// is a recipient.
pub fn probe<R: Read>(source: R, identities: &[&x25519::Identity]) -> Result<bool> {
    let decryptor = open_header(source)?;
    if identities.is_empty() {
        return Ok(false);
    }

    match decryptor.decrypt(identities.iter().map(|i| *i as &dyn age::Identity)) {
        Ok(_) => Ok(true),
        Err(DecryptError::NoMatchingKeys) => Ok(false),
        Err(e) => Err(decrypt_error(e)),
    }
}

/// Decrypt a message with `identities`, returning a streaming reader.
pub fn decrypt_with<R: Read>(
    source: R,
    identities: &[&x25519::Identity],
) -> Result<MessageReader<R>> {
    trace!(identities = identities.len(), "decrypting");

    open_header(source)?
        .decrypt(identities.iter().map(|i| *i as &dyn age::Identity))
        .map_err(decrypt_error)
}

fn open_header<R: Read>(source: R) -> Result<age::Decryptor<ArmoredReader<BufReader<R>>>> {
    let reader = ArmoredReader::new(source);
    age::Decryptor::new(reader).map_err(|e| match e {
        DecryptError::Io(io) if !is_format_io(&io) => Error::Io(io),
        other => Error::Format(format!("not an encrypted entry: {}", other)),
    })
}

fn is_format_io(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

fn decrypt_error(err: DecryptError) -> Error {
    match err {
        DecryptError::NoMatchingKeys => {
            Error::Decryption("no available private key is a recipient of this entry".to_string())
        }
        e @ (DecryptError::InvalidHeader | DecryptError::UnknownFormat | DecryptError::InvalidMac) => {
            Error::Format(e.to_string())
        }
        DecryptError::Io(io) if is_format_io(&io) => Error::Format(io.to_string()),
        DecryptError::Io(io) => Error::Io(io),
        other => Error::Decryption(other.to_string()),
    }
}

/// Encrypt a secret key under a passphrase, returning armored text.
pub fn lock_secret(identity: &x25519::Identity, passphrase: &SecretString) -> Result<String> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::from(passphrase.expose_secret().to_string()));

    let mut out = Vec::new();
    let armored = ArmoredWriter::wrap_output(&mut out, Format::AsciiArmor)?;
    let mut writer = encryptor
        .wrap_output(armored)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    writer.write_all(identity.to_string().expose_secret().as_bytes())?;
    writer.finish()?.finish()?;

    String::from_utf8(out).map_err(|e| Error::Encryption(format!("UTF-8 error: {}", e)))
}

/// Decrypt a secret key locked by [`lock_secret`].
pub fn unlock_secret(armored: &str, passphrase: &SecretString) -> Result<x25519::Identity> {
    let identity =
        age::scrypt::Identity::new(SecretString::from(passphrase.expose_secret().to_string()));

    let decryptor = age::Decryptor::new(ArmoredReader::new(armored.as_bytes()))
        .map_err(|e| Error::Format(format!("locked secret: {}", e)))?;

    let mut reader = decryptor
        .decrypt(std::iter::once(&identity as &dyn age::Identity))
        .map_err(|_| Error::Decryption("incorrect passphrase".to_string()))?;

    let mut plain = Zeroizing::new(String::new());
    reader
        .read_to_string(&mut plain)
        .map_err(|e| Error::Format(format!("locked secret: {}", e)))?;

    plain
        .trim()
        .parse()
        .map_err(|e: &str| Error::Format(format!("locked secret: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encrypt(plaintext: &[u8], recipients: &[&x25519::Recipient]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = encrypt_to(&mut out, recipients).unwrap();
        writer.write_all(plaintext).unwrap();
        writer.finish().unwrap().finish().unwrap();
        out
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let identity = x25519::Identity::generate();
        let recipient = identity.to_public();

        let encrypted = encrypt(b"Hello, World!", &[&recipient]);
        assert!(String::from_utf8_lossy(&encrypted).contains("-----BEGIN AGE ENCRYPTED FILE-----"));

        let mut reader = decrypt_with(encrypted.as_slice(), &[&identity]).unwrap();
        let mut decrypted = Vec::new();
        reader.read_to_end(&mut decrypted).unwrap();
        assert_eq!(decrypted, b"Hello, World!");
    }

    #[test]
    fn test_probe_reports_non_recipient() {
        let owner = x25519::Identity::generate();
        let stranger = x25519::Identity::generate();
        let encrypted = encrypt(b"secret", &[&owner.to_public()]);

        assert!(probe(encrypted.as_slice(), &[&owner]).unwrap());
        assert!(!probe(encrypted.as_slice(), &[&stranger]).unwrap());
        assert!(!probe(encrypted.as_slice(), &[]).unwrap());
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let err = probe(&b"definitely not age"[..], &[]).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let owner = x25519::Identity::generate();
        let stranger = x25519::Identity::generate();
        let encrypted = encrypt(b"secret", &[&owner.to_public()]);

        let err = decrypt_with(encrypted.as_slice(), &[&stranger]).err().unwrap();
        assert!(matches!(err, Error::Decryption(_)));
    }

    #[test]
    fn test_lock_unlock_secret() {
        let identity = x25519::Identity::generate();
        let passphrase = SecretString::from("correct horse".to_string());

        let locked = lock_secret(&identity, &passphrase).unwrap();
        assert!(!locked.contains("AGE-SECRET-KEY"));

        let unlocked = unlock_secret(&locked, &passphrase).unwrap();
        assert_eq!(
            unlocked.to_public().to_string(),
            identity.to_public().to_string()
        );

        let wrong = SecretString::from("battery staple".to_string());
        assert!(matches!(
            unlock_secret(&locked, &wrong),
            Err(Error::Decryption(_))
        ));
    }
}
