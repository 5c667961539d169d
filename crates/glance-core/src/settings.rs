//! Chat settings shared across the panel.
//!
//! A flat record loaded at process start and overwritten on every edit;
//! there is no versioning and no explicit "apply" step.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default cap on the assistant's response length.
pub const DEFAULT_MAX_TOKENS: u32 = 300;
/// Default sampling temperature for the chat request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// The user-editable settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Bearer credential for the chat API. Absent until the user enters one;
    /// while absent the send action is inert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Response-length cap passed to the chat API.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Randomness temperature passed to the chat API.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Settings {
    /// True when a non-empty credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

/// An abstract repository for the settings record.
///
/// Settings edits persist on every change; a failed write loses only that
/// one edit (last-write-wins, no queueing).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the stored settings, falling back to defaults for missing fields.
    async fn load(&self) -> Result<Settings>;

    /// Overwrites the stored settings with the given record.
    async fn save(&self, settings: &Settings) -> Result<()>;
}
