//! Frame-buffer rasterizer.
//!
//! Crops a rendered RGBA frame of the page to the selected region and
//! encodes it as a PNG data URI.

use async_trait::async_trait;
use glance_core::capture::{CapturedImage, Rasterizer, Region};
use glance_core::error::{GlanceError, Result};
use image::{ImageFormat, RgbaImage, imageops};
use std::io::Cursor;

/// Rasterizes capture regions out of an in-memory RGBA frame.
///
/// Regions that reach outside the frame are rasterization errors, the same
/// way content the host renderer cannot raster is: the overlay reports
/// them as capture failures instead of producing a partial image.
pub struct FrameRasterizer {
    frame: RgbaImage,
}

impl FrameRasterizer {
    pub fn new(frame: RgbaImage) -> Self {
        Self { frame }
    }

    fn crop_region(&self, region: Region) -> Result<RgbaImage> {
        if region.x < 0.0 || region.y < 0.0 {
            return Err(GlanceError::capture(format!(
                "selection origin ({}, {}) is outside the rendered frame",
                region.x, region.y
            )));
        }

        let x = region.x.floor() as u32;
        let y = region.y.floor() as u32;
        let width = (region.width.ceil() as u32).max(1);
        let height = (region.height.ceil() as u32).max(1);

        let (frame_width, frame_height) = self.frame.dimensions();
        if u64::from(x) + u64::from(width) > u64::from(frame_width)
            || u64::from(y) + u64::from(height) > u64::from(frame_height)
        {
            return Err(GlanceError::capture(format!(
                "selection {}x{} at ({}, {}) extends outside the {}x{} frame",
                width, height, x, y, frame_width, frame_height
            )));
        }

        Ok(imageops::crop_imm(&self.frame, x, y, width, height).to_image())
    }
}

#[async_trait]
impl Rasterizer for FrameRasterizer {
    async fn rasterize(&self, region: Region) -> Result<CapturedImage> {
        let cropped = self.crop_region(region)?;

        let mut bytes = Vec::new();
        cropped
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|err| GlanceError::capture(format!("PNG encoding failed: {err}")))?;

        Ok(CapturedImage::from_png_bytes(&bytes))
    }
}
