//! Directory-backed JSON key/value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go through a temporary file
//! and a rename so a crash never leaves a half-written blob behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use omana_common::{OmanaError, OmanaResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

const EXTENSION: &str = "json";
const QUARANTINE_EXTENSION: &str = "json.corrupt";

/// A directory of JSON blobs.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> OmanaResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            OmanaError::StorageError(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        info!(dir = %dir.display(), "Opened local store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> OmanaResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(OmanaError::invalid_parameter(
                "key",
                format!("'{}' may only contain letters, digits, '-' and '_'", key),
            ));
        }
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }

    /// Read and decode a blob; `Ok(None)` when the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> OmanaResult<Option<T>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            OmanaError::StorageError(format!("Corrupt blob '{}': {}", key, e))
        })?;
        Ok(Some(value))
    }

    /// Encode and write a blob, replacing any previous value.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> OmanaResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = bytes.len(), "Stored blob");
        Ok(())
    }

    /// Delete a blob; returns whether it existed.
    pub fn remove(&self, key: &str) -> OmanaResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Move a blob aside to `<key>.json.corrupt`, replacing any earlier
    /// backup. Returns the backup path, or `None` when the key is absent.
    pub fn quarantine(&self, key: &str) -> OmanaResult<Option<PathBuf>> {
        let path = self.path_for(key)?;
        let backup = path.with_extension(QUARANTINE_EXTENSION);
        match fs::rename(&path, &backup) {
            Ok(()) => {
                warn!(key, backup = %backup.display(), "Moved unreadable blob aside");
                Ok(Some(backup))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> OmanaResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
