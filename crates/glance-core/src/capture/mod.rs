//! Region capture: selection geometry, the pointer-drag gesture, and
//! rasterization of the selected rectangle.
//!
//! # Module Structure
//!
//! - `geometry`: `Point`, `Region`, and bounding-box math
//! - `gesture`: the pure `SelectionGesture` state machine
//! - `image`: the `CapturedImage` payload handed to the panel
//! - `rasterizer`: the `Rasterizer` seam to the host renderer
//! - `overlay`: `CaptureOverlay`, one per page context

mod geometry;
mod gesture;
mod image;
mod overlay;
mod rasterizer;

// Re-export public API
pub use geometry::{Point, Region, normalize_bounds};
pub use gesture::{GestureChange, PointerEvent, SelectionGesture};
pub use image::CapturedImage;
pub use overlay::CaptureOverlay;
pub use rasterizer::Rasterizer;
