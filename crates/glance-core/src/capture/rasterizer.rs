//! Rasterization seam between the overlay and the host renderer.

use super::geometry::Region;
use super::image::CapturedImage;
use crate::error::Result;
use async_trait::async_trait;

/// Renders a rectangular region of the page into an encoded image.
///
/// Implementations must not panic: renderer failures and regions the host
/// cannot raster (the cross-origin case) are reported as `Err`, which the
/// overlay turns into an explicit capture-failed signal.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterizes exactly `region` of the page.
    async fn rasterize(&self, region: Region) -> Result<CapturedImage>;
}
