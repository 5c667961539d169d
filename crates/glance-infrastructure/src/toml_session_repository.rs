//! TOML-based SessionRepository implementation

use anyhow::{Context, Result};
use async_trait::async_trait;
use glance_core::session::{Session, SessionRepository};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::GlancePaths;

/// A repository implementation that stores each session as an individual
/// TOML file in a `sessions/` directory.
///
/// The stored files are snapshots of the panel's in-memory collection; the
/// panel is the only writer, and a snapshot overwritten by a later save is
/// the expected last-write-wins outcome.
pub struct TomlSessionRepository {
    base_dir: PathBuf,
}

impl TomlSessionRepository {
    /// Creates a new `TomlSessionRepository` with the specified base directory.
    ///
    /// The directory structure will be created if it doesn't exist:
    /// ```text
    /// base_dir/
    /// └── sessions/
    ///     ├── <session-id-1>.toml
    ///     └── <session-id-2>.toml
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the directory structure cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        let sessions_dir = base_dir.join("sessions");
        fs::create_dir_all(&sessions_dir).context("Failed to create sessions directory")?;

        Ok(Self { base_dir })
    }

    /// Creates a `TomlSessionRepository` at the default location
    /// (`~/.config/glance`).
    pub fn default_location() -> Result<Self> {
        Self::new(GlancePaths::config_dir()?)
    }

    /// Returns the file path for a given session ID.
    fn session_file_path(&self, session_id: &str) -> PathBuf {
        self.base_dir
            .join("sessions")
            .join(format!("{}.toml", session_id))
    }

    fn load_session_from_path(&self, path: &Path) -> Result<Session> {
        let toml_content = fs::read_to_string(path)
            .context(format!("Failed to read session file: {:?}", path))?;

        toml::from_str(&toml_content)
            .context(format!("Failed to parse session file: {:?}", path))
    }
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let file_path = self.session_file_path(session_id);

        if !file_path.exists() {
            return Ok(None);
        }

        self.load_session_from_path(&file_path).map(Some)
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let file_path = self.session_file_path(&session.id);

        let toml_content = toml::to_string_pretty(session)
            .context("Failed to serialize session data to TOML")?;

        fs::write(&file_path, toml_content)
            .context(format!("Failed to write session file: {:?}", file_path))?;

        Ok(())
    }

    async fn save_all(&self, sessions: &[Session]) -> Result<()> {
        for session in sessions {
            self.save(session).await?;
        }
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let file_path = self.session_file_path(session_id);

        if file_path.exists() {
            fs::remove_file(&file_path)
                .context(format!("Failed to delete session file: {:?}", file_path))?;
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let sessions_dir = self.base_dir.join("sessions");
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&sessions_dir).context("Failed to read sessions directory")? {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                match self.load_session_from_path(&path) {
                    Ok(session) => sessions.push(session),
                    Err(err) => {
                        tracing::warn!("skipping unreadable session file {:?}: {err:#}", path)
                    }
                }
            }
        }

        // Most recently updated first (RFC 3339 strings sort correctly)
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(sessions)
    }
}
