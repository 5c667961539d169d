//! Session domain module.
//!
//! This module contains all session-related domain models and the
//! repository interface for persistence.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`)
//! - `message`: Conversation turn types (`TurnRole`, `Turn`)
//! - `repository`: Repository trait for session persistence

mod message;
mod model;
mod repository;

// Re-export public API
pub use message::{Turn, TurnRole};
pub use model::Session;
pub use repository::SessionRepository;
