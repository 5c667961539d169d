//! Panel state: the session collection, settings, and the send cycle.

use std::sync::Arc;

use glance_core::capture::CapturedImage;
use glance_core::error::{GlanceError, Result};
use glance_core::relay::CaptureSignal;
use glance_core::session::{Session, SessionRepository, Turn};
use glance_core::settings::{Settings, SettingsRepository};
use glance_infrastructure::{TomlSessionRepository, TomlSettingsRepository};

use crate::vision_agent::VisionChat;

/// Fixed prompt sent with every captured image.
pub const CAPTURE_PROMPT: &str = "What do you see in this image?";

/// Lifecycle of one outbound chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendState {
    Idle,
    Sending,
}

/// What a `send_to_chat` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The exchange completed and two turns were appended.
    Completed,
    /// The send was refused without issuing a request.
    Blocked(BlockReason),
    /// The request failed; the message is what the user sees.
    Failed(String),
}

/// Why a send was refused before any request went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// A prior send is still in flight; duplicates are blocked, not queued.
    AlreadySending,
    /// No credential is configured; the send control is inert.
    MissingCredential,
    /// There is no captured image or active session to send.
    NothingCaptured,
}

/// The interactive surface showing captured images and chat history.
///
/// The panel owns the session collection: the in-memory `Vec<Session>` is
/// authoritative and the persisted snapshots are a cache, never a second
/// writer. One panel instance drives one request at a time
/// (Idle -> Sending -> Idle); a send issued while Sending is a no-op.
pub struct Panel {
    sessions: Vec<Session>,
    active_id: Option<String>,
    screenshot: Option<CapturedImage>,
    response: Option<String>,
    error: Option<String>,
    settings_open: bool,
    settings: Settings,
    state: SendState,
    session_repository: Arc<dyn SessionRepository>,
    settings_repository: Arc<dyn SettingsRepository>,
    chat: Arc<dyn VisionChat>,
}

impl Panel {
    /// Builds a panel over explicit backends, loading settings and the
    /// stored session collection into memory.
    ///
    /// Load failures fall back to defaults / an empty collection with a
    /// logged warning; the panel must come up even with unreadable storage.
    pub async fn open(
        session_repository: Arc<dyn SessionRepository>,
        settings_repository: Arc<dyn SettingsRepository>,
        chat: Arc<dyn VisionChat>,
    ) -> Self {
        let settings = match settings_repository.load().await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("failed to load settings, using defaults: {err:#}");
                Settings::default()
            }
        };

        let sessions = match session_repository.list_all().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!("failed to load stored sessions: {err:#}");
                Vec::new()
            }
        };

        Self {
            sessions,
            active_id: None,
            screenshot: None,
            response: None,
            error: None,
            settings_open: false,
            settings,
            state: SendState::Idle,
            session_repository,
            settings_repository,
            chat,
        }
    }

    /// Panel wired to the default on-disk storage locations.
    pub async fn open_default(chat: Arc<dyn VisionChat>) -> Result<Self> {
        let session_repository = Arc::new(TomlSessionRepository::default_location()?);
        let settings_repository = Arc::new(TomlSettingsRepository::default_location()?);
        Ok(Self::open(session_repository, settings_repository, chat).await)
    }

    // ============================================================================
    // Capture intake
    // ============================================================================

    /// Handles a forwarded capture signal from the coordinator.
    pub fn on_capture_signal(&mut self, signal: CaptureSignal) {
        match signal {
            CaptureSignal::CaptureProduced { image } => self.on_capture(image),
            CaptureSignal::CaptureFailed { reason } => {
                self.error = Some(format!("Capture failed: {reason}"));
            }
            // Addressed to page overlays, not panels.
            CaptureSignal::BeginCapture => {}
        }
    }

    /// Starts a new session for a freshly captured image.
    pub fn on_capture(&mut self, image: CapturedImage) {
        let session = Session::new();
        self.active_id = Some(session.id.clone());
        self.sessions.push(session);
        self.screenshot = Some(image);
        self.response = None;
        self.error = None;
    }

    // ============================================================================
    // Send cycle
    // ============================================================================

    /// Sends the captured image with the fixed prompt to the chat API.
    ///
    /// Refused without a request while a send is in flight, while no
    /// credential is configured, or while nothing has been captured. On
    /// success the active session grows by exactly two turns (user prompt,
    /// assistant reply) and its snapshot is persisted; on failure the turn
    /// sequence is untouched and the error is surfaced for display. The
    /// panel is back in Idle either way.
    pub async fn send_to_chat(&mut self) -> SendOutcome {
        if self.state == SendState::Sending {
            return SendOutcome::Blocked(BlockReason::AlreadySending);
        }
        if !self.settings.has_credential() {
            return SendOutcome::Blocked(BlockReason::MissingCredential);
        }
        let (Some(image), Some(active_id)) = (self.screenshot.clone(), self.active_id.clone())
        else {
            return SendOutcome::Blocked(BlockReason::NothingCaptured);
        };

        self.state = SendState::Sending;
        self.error = None;

        let prior_turns = self
            .session(&active_id)
            .map(|session| session.turns.clone())
            .unwrap_or_default();

        let result = self
            .chat
            .describe(&prior_turns, CAPTURE_PROMPT, &image, &self.settings)
            .await;

        self.state = SendState::Idle;

        match result {
            Ok(reply) => {
                self.response = Some(reply.clone());

                let Some(session) = self.session_mut(&active_id) else {
                    tracing::warn!(session = %active_id, "active session vanished before the reply was recorded");
                    return SendOutcome::Failed("Error: session no longer exists".to_string());
                };
                session.push_turn(Turn::user(CAPTURE_PROMPT));
                session.push_turn(Turn::assistant(reply));

                let snapshot = session.clone();
                if let Err(err) = self.session_repository.save(&snapshot).await {
                    tracing::warn!(session = %snapshot.id, "failed to persist session snapshot: {err:#}");
                }

                SendOutcome::Completed
            }
            Err(err) => {
                let message = format!("Error: {err}");
                self.error = Some(message.clone());
                SendOutcome::Failed(message)
            }
        }
    }

    // ============================================================================
    // Collection commands
    // ============================================================================

    /// Persists the entire in-memory session collection unconditionally,
    /// not just the active session; unrelated sessions are rewritten too.
    pub async fn save(&self) -> Result<()> {
        self.session_repository
            .save_all(&self.sessions)
            .await
            .map_err(GlanceError::from)
    }

    /// Removes the active session from memory and storage and clears the
    /// captured image, response, and error display state.
    pub async fn delete(&mut self) -> Result<()> {
        let Some(active_id) = self.active_id.take() else {
            return Ok(());
        };

        self.sessions.retain(|session| session.id != active_id);
        self.screenshot = None;
        self.response = None;
        self.error = None;

        self.session_repository
            .delete(&active_id)
            .await
            .map_err(GlanceError::from)
    }

    // ============================================================================
    // Settings
    // ============================================================================

    /// Sets the chat API credential. A blank entry clears it, which makes
    /// the send control inert again. Persists immediately.
    pub async fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<()> {
        let key = api_key.into();
        self.settings.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self.persist_settings().await
    }

    /// Sets the response-length cap. Persists immediately.
    pub async fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()> {
        self.settings.max_tokens = max_tokens;
        self.persist_settings().await
    }

    /// Sets the sampling temperature. Persists immediately.
    pub async fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.settings.temperature = temperature;
        self.persist_settings().await
    }

    /// Shows or hides the settings drawer.
    pub fn toggle_settings(&mut self) {
        self.settings_open = !self.settings_open;
    }

    async fn persist_settings(&self) -> Result<()> {
        self.settings_repository
            .save(&self.settings)
            .await
            .map_err(GlanceError::from)
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active_id.as_deref().and_then(|id| self.session(id))
    }

    pub fn screenshot(&self) -> Option<&CapturedImage> {
        self.screenshot.as_ref()
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_sending(&self) -> bool {
        self.state == SendState::Sending
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id == id)
    }

    fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use glance_core::session::TurnRole;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock SessionRepository for testing
    struct MockSessionRepository {
        sessions: Mutex<HashMap<String, Session>>,
    }

    impl MockSessionRepository {
        fn new() -> Self {
            Self {
                sessions: Mutex::new(HashMap::new()),
            }
        }

        fn stored_count(&self) -> usize {
            self.sessions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SessionRepository for MockSessionRepository {
        async fn find_by_id(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn save(&self, session: &Session) -> anyhow::Result<()> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn save_all(&self, sessions: &[Session]) -> anyhow::Result<()> {
            for session in sessions {
                self.save(session).await?;
            }
            Ok(())
        }

        async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().remove(session_id);
            Ok(())
        }

        async fn list_all(&self) -> anyhow::Result<Vec<Session>> {
            Ok(self.sessions.lock().unwrap().values().cloned().collect())
        }
    }

    // Mock SettingsRepository for testing
    struct MockSettingsRepository {
        saved: Mutex<Option<Settings>>,
    }

    impl MockSettingsRepository {
        fn new() -> Self {
            Self {
                saved: Mutex::new(None),
            }
        }

        fn last_saved(&self) -> Option<Settings> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SettingsRepository for MockSettingsRepository {
        async fn load(&self) -> anyhow::Result<Settings> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
        }

        async fn save(&self, settings: &Settings) -> anyhow::Result<()> {
            *self.saved.lock().unwrap() = Some(settings.clone());
            Ok(())
        }
    }

    // Mock VisionChat for testing
    struct MockChat {
        reply: std::result::Result<String, GlanceError>,
        calls: Mutex<u32>,
    }

    impl MockChat {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(0),
            }
        }

        fn failing(err: GlanceError) -> Self {
            Self {
                reply: Err(err),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl VisionChat for MockChat {
        async fn describe(
            &self,
            _prior_turns: &[Turn],
            _prompt: &str,
            _image: &CapturedImage,
            _settings: &Settings,
        ) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.reply.clone()
        }
    }

    struct Fixture {
        session_repository: Arc<MockSessionRepository>,
        settings_repository: Arc<MockSettingsRepository>,
        chat: Arc<MockChat>,
    }

    async fn panel_with(chat: MockChat) -> (Panel, Fixture) {
        let fixture = Fixture {
            session_repository: Arc::new(MockSessionRepository::new()),
            settings_repository: Arc::new(MockSettingsRepository::new()),
            chat: Arc::new(chat),
        };
        let panel = Panel::open(
            fixture.session_repository.clone(),
            fixture.settings_repository.clone(),
            fixture.chat.clone(),
        )
        .await;
        (panel, fixture)
    }

    fn image() -> CapturedImage {
        CapturedImage::from_png_bytes(&[1, 2, 3])
    }

    #[tokio::test]
    async fn test_capture_starts_a_fresh_session() {
        let (mut panel, _fixture) = panel_with(MockChat::replying("A chart.")).await;
        panel.response = Some("stale".to_string());

        panel.on_capture(image());

        let session = panel.active_session().unwrap();
        assert!(session.turns.is_empty());
        assert_eq!(panel.sessions().len(), 1);
        assert!(panel.screenshot().is_some());
        assert!(panel.response().is_none());
    }

    #[tokio::test]
    async fn test_successful_send_appends_exactly_two_turns() {
        let (mut panel, fixture) = panel_with(MockChat::replying("A login form.")).await;
        panel.set_api_key("sk-test").await.unwrap();
        panel.on_capture(image());
        let id_before = panel.active_session().unwrap().id.clone();

        let outcome = panel.send_to_chat().await;

        assert_eq!(outcome, SendOutcome::Completed);
        let session = panel.active_session().unwrap();
        assert_eq!(session.id, id_before);
        assert_eq!(session.turns.len(), 2);
        assert_eq!(session.turns[0].role, TurnRole::User);
        assert_eq!(session.turns[0].content, CAPTURE_PROMPT);
        assert_eq!(session.turns[1].role, TurnRole::Assistant);
        assert_eq!(session.turns[1].content, "A login form.");
        assert_eq!(panel.response(), Some("A login form."));
        assert!(!panel.is_sending());

        // The snapshot was persisted.
        let stored = fixture
            .session_repository
            .find_by_id(&id_before)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.turns.len(), 2);
    }

    #[tokio::test]
    async fn test_send_without_credential_is_inert() {
        let (mut panel, fixture) = panel_with(MockChat::replying("unused")).await;
        panel.on_capture(image());

        let outcome = panel.send_to_chat().await;

        assert_eq!(outcome, SendOutcome::Blocked(BlockReason::MissingCredential));
        assert_eq!(fixture.chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_send_while_sending_is_a_no_op() {
        let (mut panel, fixture) = panel_with(MockChat::replying("unused")).await;
        panel.set_api_key("sk-test").await.unwrap();
        panel.on_capture(image());
        panel.state = SendState::Sending;

        let outcome = panel.send_to_chat().await;

        assert_eq!(outcome, SendOutcome::Blocked(BlockReason::AlreadySending));
        assert_eq!(fixture.chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_send_without_capture_is_refused() {
        let (mut panel, fixture) = panel_with(MockChat::replying("unused")).await;
        panel.set_api_key("sk-test").await.unwrap();

        let outcome = panel.send_to_chat().await;

        assert_eq!(outcome, SendOutcome::Blocked(BlockReason::NothingCaptured));
        assert_eq!(fixture.chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_send_leaves_turns_untouched() {
        let (mut panel, _fixture) = panel_with(MockChat::failing(GlanceError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        }))
        .await;
        panel.set_api_key("sk-bad").await.unwrap();
        panel.on_capture(image());

        let outcome = panel.send_to_chat().await;

        let SendOutcome::Failed(message) = outcome else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert!(message.contains("Unauthorized"));
        assert!(message.starts_with("Error:"));
        assert_eq!(panel.error(), Some(message.as_str()));
        assert!(panel.active_session().unwrap().turns.is_empty());
        assert!(!panel.is_sending());
    }

    #[tokio::test]
    async fn test_save_writes_the_whole_collection() {
        let (mut panel, fixture) = panel_with(MockChat::replying("unused")).await;

        // Two captures, two sessions; only the second is active.
        panel.on_capture(image());
        panel.on_capture(image());

        panel.save().await.unwrap();

        assert_eq!(fixture.session_repository.stored_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_active_session_and_display_state() {
        let (mut panel, fixture) = panel_with(MockChat::replying("A form.")).await;
        panel.set_api_key("sk-test").await.unwrap();
        panel.on_capture(image());
        panel.send_to_chat().await;
        let id = panel.active_session().unwrap().id.clone();

        panel.delete().await.unwrap();

        assert!(panel.active_session().is_none());
        assert!(panel.sessions().is_empty());
        assert!(panel.screenshot().is_none());
        assert!(panel.response().is_none());
        assert!(panel.error().is_none());
        assert!(
            fixture
                .session_repository
                .find_by_id(&id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_settings_edits_persist_immediately() {
        let (mut panel, fixture) = panel_with(MockChat::replying("unused")).await;

        panel.set_max_tokens(500).await.unwrap();
        assert_eq!(fixture.settings_repository.last_saved().unwrap().max_tokens, 500);

        panel.set_temperature(0.2).await.unwrap();
        assert_eq!(
            fixture.settings_repository.last_saved().unwrap().temperature,
            0.2
        );

        panel.set_api_key("  ").await.unwrap();
        assert!(fixture.settings_repository.last_saved().unwrap().api_key.is_none());
    }

    #[tokio::test]
    async fn test_capture_failed_signal_is_surfaced() {
        let (mut panel, _fixture) = panel_with(MockChat::replying("unused")).await;

        panel.on_capture_signal(CaptureSignal::CaptureFailed {
            reason: "renderer refused the region".to_string(),
        });

        assert_eq!(
            panel.error(),
            Some("Capture failed: renderer refused the region")
        );
    }

    #[tokio::test]
    async fn test_toggle_settings() {
        let (mut panel, _fixture) = panel_with(MockChat::replying("unused")).await;

        assert!(!panel.settings_open());
        panel.toggle_settings();
        assert!(panel.settings_open());
        panel.toggle_settings();
        assert!(!panel.settings_open());
    }
}
