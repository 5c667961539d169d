//! Credential file storage.
//!
//! Loads and saves the chat API credential at `~/.config/glance/secret.json`.
//!
//! # Security Note
//!
//! This is plaintext JSON storage; the file should carry restrictive
//! permissions (e.g. 600). Error messages never include the credential.

use crate::paths::GlancePaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during credential storage operations.
#[derive(Debug, Error)]
pub enum SecretStorageError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Config directory not found.
    #[error("could not determine config directory")]
    ConfigDirNotFound,
}

/// On-disk shape of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Bearer credential for the chat API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Storage for the credential file (`secret.json`).
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a `SecretStorage` at the default path
    /// (`~/.config/glance/secret.json`).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = GlancePaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a `SecretStorage` with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the credential record.
    ///
    /// A missing file is not an error: the credential simply has not been
    /// set yet, and the send action stays inert.
    pub fn load(&self) -> Result<SecretRecord, SecretStorageError> {
        if !self.path.exists() {
            return Ok(SecretRecord::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&content)?;

        Ok(record)
    }

    /// Overwrites the credential record.
    pub fn save(&self, record: &SecretRecord) -> Result<(), SecretStorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, content)?;

        Ok(())
    }

    /// Returns the path to the credential file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_as_empty_record() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SecretStorage::with_path(temp_dir.path().join("secret.json"));

        let record = storage.load().unwrap();
        assert!(record.api_key.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SecretStorage::with_path(temp_dir.path().join("secret.json"));

        storage
            .save(&SecretRecord {
                api_key: Some("test-key-123".to_string()),
            })
            .unwrap();

        let record = storage.load().unwrap();
        assert_eq!(record.api_key.as_deref(), Some("test-key-123"));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(&path, "{ invalid json").unwrap();

        let storage = SecretStorage::with_path(path);
        let result = storage.load();

        assert!(matches!(result, Err(SecretStorageError::Parse(_))));
    }
}
