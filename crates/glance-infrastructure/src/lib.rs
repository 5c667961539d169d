//! Storage and rendering backends for Glance.
//!
//! Provides the on-disk implementations of the core repository traits
//! (sessions and settings) and a frame-buffer rasterizer for capture.

pub mod paths;
pub mod storage;

mod frame_rasterizer;
mod toml_session_repository;
mod toml_settings_repository;

pub use frame_rasterizer::FrameRasterizer;
pub use toml_session_repository::TomlSessionRepository;
pub use toml_settings_repository::TomlSettingsRepository;
