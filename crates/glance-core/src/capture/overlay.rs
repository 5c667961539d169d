//! In-page capture overlay.

use std::sync::Arc;

use super::gesture::{GestureChange, PointerEvent, SelectionGesture};
use super::geometry::Region;
use super::rasterizer::Rasterizer;
use crate::relay::CaptureReporter;

/// The in-page capture component; one instance is attached per page context.
///
/// The overlay owns the selection gesture for its page, rasterizes the
/// finalized region, and reports the outcome through the relay. A
/// rasterization failure becomes a capture-failed signal; the gesture is
/// already resolved by then, so the overlay is never left stuck in
/// Selecting.
pub struct CaptureOverlay {
    gesture: SelectionGesture,
    rasterizer: Arc<dyn Rasterizer>,
    reporter: CaptureReporter,
}

impl CaptureOverlay {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, reporter: CaptureReporter) -> Self {
        Self {
            gesture: SelectionGesture::new(),
            rasterizer,
            reporter,
        }
    }

    /// Services a begin-capture signal from the coordinator.
    ///
    /// Ignored while a selection is already in progress (see
    /// [`SelectionGesture::begin`]).
    pub fn begin_capture(&mut self) {
        if !self.gesture.begin() {
            tracing::debug!("begin-capture ignored: selection already in progress");
        }
    }

    /// True while the overlay is servicing a begin-capture signal.
    pub fn is_selecting(&self) -> bool {
        self.gesture.is_selecting()
    }

    /// Current selection box bounds for the host to draw, if any.
    pub fn selection_box(&self) -> Option<Region> {
        self.gesture.selection_box()
    }

    /// Feeds one pointer event from the host page.
    ///
    /// When the event completes the drag, the finalized region is
    /// rasterized and the outcome (image or failure reason) is reported
    /// through the relay.
    pub async fn pointer(&mut self, event: PointerEvent) -> GestureChange {
        let change = self.gesture.pointer(event);

        if let GestureChange::Finished(region) = change {
            match self.rasterizer.rasterize(region).await {
                Ok(image) => self.reporter.produced(image),
                Err(err) => {
                    tracing::warn!("rasterization failed: {err}");
                    self.reporter.failed(err.to_string());
                }
            }
        }

        change
    }

    /// Abandons any in-flight gesture (page teardown, escape key).
    pub fn cancel(&mut self) {
        self.gesture.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CapturedImage, Point};
    use crate::error::{GlanceError, Result};
    use crate::relay::{CaptureSignal, Coordinator};
    use async_trait::async_trait;

    struct StubRasterizer {
        fail: bool,
    }

    #[async_trait]
    impl Rasterizer for StubRasterizer {
        async fn rasterize(&self, region: Region) -> Result<CapturedImage> {
            if self.fail {
                Err(GlanceError::capture("renderer refused the region"))
            } else {
                Ok(CapturedImage::from_data_uri(format!(
                    "data:image/png;base64,{}x{}",
                    region.width, region.height
                )))
            }
        }
    }

    async fn drag(overlay: &mut CaptureOverlay) {
        overlay.begin_capture();
        overlay.pointer(PointerEvent::Press(Point::new(50.0, 50.0))).await;
        overlay.pointer(PointerEvent::Move(Point::new(120.0, 80.0))).await;
        overlay
            .pointer(PointerEvent::Release(Point::new(200.0, 150.0)))
            .await;
    }

    #[tokio::test]
    async fn test_completed_drag_reports_produced_image() {
        let coordinator = Coordinator::new();
        let mut events = coordinator.subscribe();
        let mut overlay = CaptureOverlay::new(
            Arc::new(StubRasterizer { fail: false }),
            coordinator.reporter(),
        );

        drag(&mut overlay).await;

        let signal = events.recv().await.unwrap();
        let CaptureSignal::CaptureProduced { image } = signal else {
            panic!("expected CaptureProduced, got {signal:?}");
        };
        assert_eq!(image.as_data_uri(), "data:image/png;base64,150x100");
        assert!(!overlay.is_selecting());
    }

    #[tokio::test]
    async fn test_rasterization_failure_reports_and_resolves() {
        let coordinator = Coordinator::new();
        let mut events = coordinator.subscribe();
        let mut overlay = CaptureOverlay::new(
            Arc::new(StubRasterizer { fail: true }),
            coordinator.reporter(),
        );

        drag(&mut overlay).await;

        let signal = events.recv().await.unwrap();
        let CaptureSignal::CaptureFailed { reason } = signal else {
            panic!("expected CaptureFailed, got {signal:?}");
        };
        assert!(reason.contains("renderer refused"));
        // The overlay is back in Idle, ready for the next gesture.
        assert!(!overlay.is_selecting());
        overlay.begin_capture();
        assert!(overlay.is_selecting());
    }

    #[tokio::test]
    async fn test_outcome_dropped_when_no_panel_listens() {
        let coordinator = Coordinator::new();
        let mut overlay = CaptureOverlay::new(
            Arc::new(StubRasterizer { fail: false }),
            coordinator.reporter(),
        );

        // No subscriber attached: the image is dropped, nothing panics.
        drag(&mut overlay).await;
        assert!(!overlay.is_selecting());
    }
}
