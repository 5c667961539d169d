//! Typed capture signals.

use crate::capture::CapturedImage;
use serde::{Deserialize, Serialize};

/// Tagged payload delivered over the capture relay.
///
/// Delivery is fire-and-forget: a signal sent while no listener is
/// attached is dropped. There is no queue, buffer, or retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureSignal {
    /// Arm the focused page's capture overlay.
    BeginCapture,
    /// A gesture completed and rasterized into an image.
    CaptureProduced { image: CapturedImage },
    /// A gesture completed but rasterization failed.
    CaptureFailed { reason: String },
}
