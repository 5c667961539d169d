//! Captured image payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

/// An encoded raster produced once per capture gesture.
///
/// Held as a data URI so it travels by value through the relay and embeds
/// directly into a chat request. The overlay does not retain it after
/// handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    data_uri: String,
}

impl CapturedImage {
    /// Wraps already-encoded PNG bytes in a `data:image/png;base64,` URI.
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self {
            data_uri: format!("data:image/png;base64,{}", BASE64_STANDARD.encode(bytes)),
        }
    }

    /// Wraps a prebuilt data URI.
    pub fn from_data_uri(data_uri: impl Into<String>) -> Self {
        Self {
            data_uri: data_uri.into(),
        }
    }

    /// The full data URI.
    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }
}
