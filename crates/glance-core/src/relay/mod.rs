//! Capture relay: typed signals and the coordinator that routes them
//! between triggers, page overlays, and panels.

mod coordinator;
mod signal;

// Re-export public API
pub use coordinator::{CaptureReporter, Coordinator, PageId};
pub use signal::CaptureSignal;
