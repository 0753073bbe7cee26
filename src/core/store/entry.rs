//! Entry names and the encrypting entry writer.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{trace, warn};

use crate::core::cipher::MessageWriter;
use crate::core::constants::ENTRY_SUFFIX;
use crate::error::{Error, Result};

/// Append `.gpg` unless the name already ends with it.
pub fn normalize(name: &str) -> String {
    if name.ends_with(ENTRY_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, ENTRY_SUFFIX)
    }
}

/// Resolve an entry name to a path under `root`.
///
/// Names are relative paths; they may point into a subfolder but never
/// outside the store.
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() || name == ENTRY_SUFFIX {
        return Err(invalid("empty name"));
    }

    let normalized = normalize(name);
    let relative = Path::new(&normalized);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not leave the store")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the store"))
            }
        }
    }

    Ok(root.join(relative))
}

/// Sibling file an entry is staged in until its writer finishes.
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Encrypting sink for one entry.
///
/// Bytes are encrypted as they arrive into a staging file next to the
/// entry. [`EntryWriter::finish`] completes the message and renames it over
/// the entry. A writer dropped without `finish` discards the staging file
/// and leaves any previous entry untouched.
pub struct EntryWriter {
    stream: Option<MessageWriter<BufWriter<File>>>,
    path: PathBuf,
    staging: PathBuf,
}

impl EntryWriter {
    pub(crate) fn new(stream: MessageWriter<BufWriter<File>>, path: PathBuf, staging: PathBuf) -> Self {
        Self {
            stream: Some(stream),
            path,
            staging,
        }
    }

    /// Path of the entry being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Complete the encrypted message, sync it and replace the entry.
    pub fn finish(mut self) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        if let Err(e) = complete(stream, &self.staging) {
            discard(&self.staging);
            return Err(e);
        }
        fs::rename(&self.staging, &self.path).map_err(|e| {
            discard(&self.staging);
            Error::at(&self.path, e)
        })?;

        trace!(path = %self.path.display(), "entry written");
        Ok(())
    }

    fn stream(&mut self) -> io::Result<&mut MessageWriter<BufWriter<File>>> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "entry already finished"))
    }
}

fn complete(stream: MessageWriter<BufWriter<File>>, staging: &Path) -> Result<()> {
    let armored = stream.finish().map_err(|e| Error::at(staging, e))?;
    let buffered = armored.finish().map_err(|e| Error::at(staging, e))?;
    let file = buffered
        .into_inner()
        .map_err(|e| Error::at(staging, e.into_error()))?;
    file.sync_all().map_err(|e| Error::at(staging, e))
}

fn discard(staging: &Path) {
    if let Err(e) = fs::remove_file(staging) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %staging.display(), error = %e, "failed to remove staged entry");
        }
    }
}

impl Write for EntryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream()?.flush()
    }
}

impl Drop for EntryWriter {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            discard(&self.staging);
            warn!(path = %self.path.display(), "entry writer dropped before finish, nothing written");
        }
    }
}

impl std::fmt::Debug for EntryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryWriter")
            .field("path", &self.path)
            .field("finished", &self.stream.is_none())
            .finish()
    }
}
