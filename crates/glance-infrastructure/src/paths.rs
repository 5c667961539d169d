//! Default filesystem locations for Glance data.
//!
//! Everything lives under `~/.config/glance/`:
//!
//! ```text
//! ~/.config/glance/
//! ├── sessions/          (one TOML file per session)
//! ├── settings.toml      (response length, temperature)
//! └── secret.json        (chat API credential)
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Resolver for the Glance configuration directory layout.
pub struct GlancePaths;

impl GlancePaths {
    /// Returns the base configuration directory, `~/.config/glance`.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("glance"))
    }

    /// Returns the settings file path, `~/.config/glance/settings.toml`.
    pub fn settings_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Returns the credential file path, `~/.config/glance/secret.json`.
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
