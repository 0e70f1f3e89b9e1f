//! Credential storage.
//!
//! The [`TokenStore`] holds at most one bearer credential. Every flow receives the
//! same `Arc<TokenStore>` ([`SessionContext`]), so readers always observe the latest
//! write. Writes go through to a [`CredentialStorage`] backend so the credential
//! survives restarts. The credential is opaque here: no validation, no expiry check.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::claims::{self, Session};
use crate::config::paths;
use crate::logging::mask_token;

/// Shared handle passed to every flow constructor.
pub type SessionContext = Arc<TokenStore>;

/// Durable key-value slot for the credential.
pub trait CredentialStorage: Send + Sync {
    /// Reads the persisted credential, if any.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Persists `credential`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn store(&self, credential: &str) -> Result<()>;

    /// Removes the persisted credential.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn remove(&self) -> Result<()>;
}

/// On-disk layout of `credentials.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Stores the credential in `<base>/credentials.json` with restricted permissions (0600).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the default location under `CALMMAP_HOME`.
    pub fn default_location() -> Self {
        Self::new(paths::credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, file: &CredentialFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(file).context("Failed to serialize credential file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut handle = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            handle
                .write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl CredentialStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials from {}", self.path.display()))?;
        let file: CredentialFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", self.path.display()))?;
        Ok(file.auth_token.filter(|t| !t.is_empty()))
    }

    fn store(&self, credential: &str) -> Result<()> {
        self.write(&CredentialFile {
            auth_token: Some(credential.to_string()),
        })
    }

    fn remove(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.write(&CredentialFile::default())
    }
}

/// Volatile storage, used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, credential: &str) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Process-wide holder of the current credential.
pub struct TokenStore {
    storage: Box<dyn CredentialStorage>,
    current: Mutex<Option<String>>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_credential", &self.get().is_some())
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates a store backed by `storage`, seeded with whatever it already holds.
    ///
    /// An unreadable backend starts the store empty (logged-out).
    pub fn new(storage: impl CredentialStorage + 'static) -> Self {
        let initial = storage.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "persisted credential could not be read; starting logged out");
            None
        });
        Self {
            storage: Box::new(storage),
            current: Mutex::new(initial),
        }
    }

    /// Empty store with no persistence.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Wraps this store into a shareable [`SessionContext`].
    pub fn into_context(self) -> SessionContext {
        Arc::new(self)
    }

    /// Returns the current credential.
    pub fn get(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current credential. Last writer wins.
    ///
    /// A persistence failure is logged; the in-process value is still updated.
    pub fn set(&self, credential: impl Into<String>) {
        let credential = credential.into();
        if let Err(err) = self.storage.store(&credential) {
            tracing::warn!(error = %err, "failed to persist credential");
        }
        tracing::debug!(token = %mask_token(&credential), "credential stored");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    /// Drops the current credential.
    pub fn clear(&self) {
        if let Err(err) = self.storage.remove() {
            tracing::warn!(error = %err, "failed to remove persisted credential");
        }
        tracing::debug!("credential cleared");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Decodes the current credential into a [`Session`].
    ///
    /// `None` when no credential is held or it cannot be decoded.
    pub fn session(&self) -> Option<Session> {
        self.get().as_deref().and_then(claims::decode)
    }
}
