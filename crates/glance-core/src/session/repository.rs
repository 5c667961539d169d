//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::Session;
use anyhow::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// This trait defines the contract for persisting and retrieving sessions,
/// decoupling the panel's core logic from the specific storage mechanism
/// (e.g., TOML files, database, remote API).
///
/// Writes are independent of each other; no write waits for a prior write
/// to the same session, so rapid consecutive saves are last-write-wins.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a single session snapshot to storage.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Saves every session in the collection unconditionally.
    ///
    /// This is the panel's explicit "save" operation: it rewrites unrelated
    /// sessions along with the active one.
    async fn save_all(&self, sessions: &[Session]) -> Result<()>;

    /// Deletes a session from storage.
    ///
    /// Deleting a session that does not exist is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions, most recently updated first.
    async fn list_all(&self) -> Result<Vec<Session>>;
}
