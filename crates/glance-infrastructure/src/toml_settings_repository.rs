//! Settings persistence.
//!
//! The tunables (response length, temperature) live in `settings.toml`
//! behind atomic writes; the credential lives separately in `secret.json`.
//! The panel sees one flat `Settings` record composed from both.

use anyhow::{Context, Result};
use async_trait::async_trait;
use glance_core::settings::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, Settings, SettingsRepository,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths::GlancePaths;
use crate::storage::{AtomicTomlFile, SecretRecord, SecretStorage};

/// On-disk shape of `settings.toml` (the credential is kept out of it).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TunablesRecord {
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_temperature")]
    temperature: f32,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for TunablesRecord {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// `SettingsRepository` backed by `settings.toml` plus `secret.json`.
pub struct TomlSettingsRepository {
    tunables: AtomicTomlFile<TunablesRecord>,
    secrets: SecretStorage,
}

impl TomlSettingsRepository {
    /// Creates a repository over explicit file paths (for testing).
    pub fn new(settings_path: PathBuf, secret_path: PathBuf) -> Self {
        Self {
            tunables: AtomicTomlFile::new(settings_path),
            secrets: SecretStorage::with_path(secret_path),
        }
    }

    /// Creates a repository at the default locations under
    /// `~/.config/glance/`.
    pub fn default_location() -> Result<Self> {
        Ok(Self {
            tunables: AtomicTomlFile::new(GlancePaths::settings_file()?),
            secrets: SecretStorage::new().context("failed to resolve credential file path")?,
        })
    }
}

#[async_trait]
impl SettingsRepository for TomlSettingsRepository {
    async fn load(&self) -> Result<Settings> {
        let tunables = self
            .tunables
            .load()
            .context("failed to load settings file")?
            .unwrap_or_default();
        let secret = self.secrets.load().context("failed to load credential file")?;

        Ok(Settings {
            api_key: secret.api_key,
            max_tokens: tunables.max_tokens,
            temperature: tunables.temperature,
        })
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        self.tunables
            .save(&TunablesRecord {
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            })
            .context("failed to write settings file")?;

        self.secrets
            .save(&SecretRecord {
                api_key: settings.api_key.clone(),
            })
            .context("failed to write credential file")?;

        Ok(())
    }
}
