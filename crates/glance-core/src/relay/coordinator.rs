//! Stateless relay between capture triggers, page overlays, and panels.

use std::collections::HashMap;

use tokio::sync::{RwLock, broadcast, mpsc};

use super::signal::CaptureSignal;
use crate::capture::CapturedImage;

/// Identifies a registered page context.
pub type PageId = String;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Routes capture signals without holding any conversation state.
///
/// Two responsibilities:
/// 1. Deliver a begin-capture trigger (global shortcut or panel button) to
///    the focused page context. With no focused page the trigger is logged
///    and dropped, never surfaced.
/// 2. Forward capture outcomes reported by an overlay, unchanged, to every
///    subscribed panel. With no subscriber at send time the signal is
///    dropped: delivery is at-most-once and best-effort.
pub struct Coordinator {
    pages: RwLock<HashMap<PageId, mpsc::UnboundedSender<CaptureSignal>>>,
    focused: RwLock<Option<PageId>>,
    events: broadcast::Sender<CaptureSignal>,
}

impl Coordinator {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pages: RwLock::new(HashMap::new()),
            focused: RwLock::new(None),
            events,
        }
    }

    /// Attaches a page context.
    ///
    /// The returned receiver delivers `BeginCapture` signals addressed to
    /// this page. Registering the same id again replaces the previous
    /// channel.
    pub async fn register_page(
        &self,
        page_id: impl Into<PageId>,
    ) -> mpsc::UnboundedReceiver<CaptureSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.pages.write().await.insert(page_id.into(), tx);
        rx
    }

    /// Detaches a page context (closed or navigated away).
    pub async fn unregister_page(&self, page_id: &str) {
        self.pages.write().await.remove(page_id);
        let mut focused = self.focused.write().await;
        if focused.as_deref() == Some(page_id) {
            *focused = None;
        }
    }

    /// Marks which page context currently has focus.
    pub async fn focus_page(&self, page_id: Option<PageId>) {
        *self.focused.write().await = page_id;
    }

    /// Relays a begin-capture trigger to the focused page's overlay.
    pub async fn begin_capture(&self) {
        let focused = self.focused.read().await.clone();
        let Some(page_id) = focused else {
            tracing::warn!("capture trigger ignored: no focused page context");
            return;
        };

        let pages = self.pages.read().await;
        let Some(tx) = pages.get(&page_id) else {
            tracing::warn!(page = %page_id, "capture trigger ignored: no overlay attached");
            return;
        };
        if tx.send(CaptureSignal::BeginCapture).is_err() {
            tracing::warn!(page = %page_id, "capture trigger dropped: page receiver is gone");
        }
    }

    /// Handle that overlays use to report capture outcomes.
    pub fn reporter(&self) -> CaptureReporter {
        CaptureReporter {
            events: self.events.clone(),
        }
    }

    /// Subscribes a panel to forwarded capture outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureSignal> {
        self.events.subscribe()
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Clonable handle that forwards capture outcomes through the relay.
#[derive(Clone)]
pub struct CaptureReporter {
    events: broadcast::Sender<CaptureSignal>,
}

impl CaptureReporter {
    /// Forwards a produced image, unchanged, to subscribed panels.
    pub fn produced(&self, image: CapturedImage) {
        self.forward(CaptureSignal::CaptureProduced { image });
    }

    /// Forwards a capture failure with its reason.
    pub fn failed(&self, reason: impl Into<String>) {
        self.forward(CaptureSignal::CaptureFailed {
            reason: reason.into(),
        });
    }

    fn forward(&self, signal: CaptureSignal) {
        if self.events.send(signal).is_err() {
            tracing::debug!("no panel listening; capture signal dropped");
        }
    }
}
