//! Session orchestrator.
//!
//! The top-level state machine selecting between the Intake, Ritual and
//! Reflection views. It owns the active mood, mediates every transition,
//! and composes the ritual engine, reflection session and activity log.
//!
//! All remote failures are absorbed here: the orchestrator converts them to
//! a stable local state plus an outcome the embedding view can surface.
//! Nothing in this module is fatal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use catalog::{Mood, RitualCatalog, RitualScript};
use moodscape_agent::{
    ChatMessage, ContactStore, MemoryContactStore, SafetyContact, SupportBackend,
};

use crate::activity::{ActivityEntry, ActivityLog};
use crate::ambience::{AmbiencePlayer, NullAmbience};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::reflection::{ReflectionSession, SendOutcome};
use crate::ritual_engine::{RitualEngine, RitualProgress};

/// The active view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Free-text check-in; no active mood
    Intake,
    /// Scripted ritual progression for the active mood
    Ritual,
    /// Open-ended reflection chat for the active mood
    Reflection,
}

/// Outcome of a check-in submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// Mood inferred and the ritual view entered
    Started(Mood),
    /// Empty input, nothing happened
    Ignored,
    /// Inference failed; still in Intake, a connectivity notice applies
    Failed,
    /// The result arrived after a reset superseded this check-in
    Superseded,
}

struct SharedState {
    view: View,
    mood: Option<Mood>,
    contact: Option<SafetyContact>,
}

/// Top-level session state machine.
pub struct SessionOrchestrator {
    config: SessionConfig,
    backend: Arc<dyn SupportBackend>,
    contacts: Arc<dyn ContactStore>,
    ambience: Arc<dyn AmbiencePlayer>,
    engine: RitualEngine,
    reflection: ReflectionSession,
    activity: RwLock<ActivityLog>,
    state: RwLock<SharedState>,
    /// Bumped on reset; an inference result from an older generation is
    /// discarded instead of applied to the newer session
    generation: AtomicU64,
    user_id: String,
}

impl SessionOrchestrator {
    /// Create an orchestrator with default configuration and catalog.
    pub fn new(backend: Arc<dyn SupportBackend>) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(backend: Arc<dyn SupportBackend>, config: SessionConfig) -> Self {
        let catalog = Arc::new(RitualCatalog::build_defaults());
        let engine = RitualEngine::new(catalog, config.ritual.autoplay_interval());
        let reflection = ReflectionSession::new(Arc::clone(&backend), config.reflection.clone());
        let activity = RwLock::new(ActivityLog::load(&config.activity));

        Self {
            config,
            backend,
            contacts: Arc::new(MemoryContactStore::new()),
            ambience: Arc::new(NullAmbience),
            engine,
            reflection,
            activity,
            state: RwLock::new(SharedState {
                view: View::Intake,
                mood: None,
                contact: None,
            }),
            generation: AtomicU64::new(0),
            user_id: "local-user".to_string(),
        }
    }

    /// Replace the ritual catalog.
    pub fn with_catalog(mut self, catalog: Arc<RitualCatalog>) -> Self {
        self.engine = RitualEngine::new(catalog, self.config.ritual.autoplay_interval());
        self
    }

    /// Set the safety-contact store.
    pub fn with_contacts(mut self, contacts: Arc<dyn ContactStore>) -> Self {
        self.contacts = contacts;
        self
    }

    /// Set the ambient audio collaborator.
    pub fn with_ambience(mut self, ambience: Arc<dyn AmbiencePlayer>) -> Self {
        self.ambience = ambience;
        self
    }

    /// Set the user identity for contact storage.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Get the session ID.
    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Load the cached safety contact for this user. Best effort: a store
    /// failure leaves the contact unset.
    pub async fn initialize(&self) {
        info!(session_id = %self.config.session_id, "Initializing session");

        match self.contacts.load(&self.user_id).await {
            Ok(contact) => {
                let mut state = self.state.write().await;
                state.contact = contact;
            }
            Err(e) => warn!(error = %e, "Could not load safety contact"),
        }
    }

    /// Submit a free-text check-in (Intake → Ritual).
    ///
    /// Empty trimmed text is silently rejected. On inference failure the
    /// session stays in Intake with the mood unset; the caller surfaces a
    /// connectivity notice from the outcome.
    pub async fn submit_check_in(&self, text: &str) -> CheckInOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty check-in");
            return CheckInOutcome::Ignored;
        }

        let generation = self.generation.load(Ordering::SeqCst);

        let mood = match self.backend.infer_mood(text).await {
            Ok(mood) => mood,
            Err(e) => {
                warn!(error = %e, "Mood inference failed");
                return CheckInOutcome::Failed;
            }
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            info!(%mood, "Discarding inference result for a superseded check-in");
            return CheckInOutcome::Superseded;
        }

        // A mood with no script is a configuration defect, handled like an
        // inference failure rather than a crash
        if let Err(e) = self.engine.start(mood).await {
            warn!(error = %e, "Ritual start failed");
            return CheckInOutcome::Failed;
        }

        self.reflection.seed_greeting(mood).await;

        {
            let mut activity = self.activity.write().await;
            activity.record(ActivityEntry::new(
                mood,
                text,
                self.config.activity.excerpt_chars,
            ));
        }

        {
            let mut state = self.state.write().await;
            state.mood = Some(mood);
            state.view = View::Ritual;
        }

        self.ambience.mood_changed(Some(mood)).await;

        info!(%mood, "Check-in accepted");
        CheckInOutcome::Started(mood)
    }

    /// Enter the reflection view (Ritual → Reflection).
    pub async fn open_reflection(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.mood.is_none() {
            return Err(SessionError::NoActiveMood);
        }
        state.view = View::Reflection;
        Ok(())
    }

    /// Return to the ritual view (Reflection → Ritual). Transcript and
    /// ritual progress are both preserved.
    pub async fn back_to_ritual(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.mood.is_none() {
            return Err(SessionError::NoActiveMood);
        }
        state.view = View::Ritual;
        Ok(())
    }

    /// Reset the whole session to Intake. Cancels any pending autoplay
    /// firing and clears the active mood and transcript; this is the only
    /// way to clear the mood.
    pub async fn reset(&self) {
        info!("Resetting session");
        self.generation.fetch_add(1, Ordering::SeqCst);

        self.engine.reset().await;
        self.reflection.clear().await;

        {
            let mut state = self.state.write().await;
            state.mood = None;
            state.view = View::Intake;
        }

        self.ambience.mood_changed(None).await;
    }

    /// Send one reflection turn for the active mood.
    pub async fn send_reflection(&self, text: &str) -> Result<SendOutcome> {
        let (mood, contact) = {
            let state = self.state.read().await;
            (
                state.mood.ok_or(SessionError::NoActiveMood)?,
                state.contact.clone(),
            )
        };

        Ok(self.reflection.send(text, mood, contact.as_ref()).await)
    }

    /// Flip ritual autoplay.
    pub async fn toggle_autoplay(&self) -> Result<()> {
        self.engine.toggle_autoplay().await
    }

    /// Jump to a ritual step.
    pub async fn go_to_step(&self, index: usize) -> Result<()> {
        self.engine.go_to_step(index).await
    }

    /// Complete the current ritual step.
    pub async fn complete_current_step(&self) -> Result<()> {
        self.engine.complete_current_step().await
    }

    /// Restart the active ritual with autoplay on.
    pub async fn restart_ritual(&self) -> Result<()> {
        self.engine.restart().await
    }

    /// Whether the distress support banner applies. Purely derived from
    /// the active mood, never stored.
    pub async fn distress_banner(&self) -> bool {
        self.state
            .read()
            .await
            .mood
            .map(|m| m.is_distress())
            .unwrap_or(false)
    }

    /// The active view.
    pub async fn view(&self) -> View {
        self.state.read().await.view
    }

    /// The active mood, if any.
    pub async fn mood(&self) -> Option<Mood> {
        self.state.read().await.mood
    }

    /// Snapshot of the ritual progress.
    pub async fn ritual_progress(&self) -> RitualProgress {
        self.engine.progress().await
    }

    /// The active ritual script, if any.
    pub async fn ritual_script(&self) -> Option<RitualScript> {
        self.engine.script().await
    }

    /// Snapshot of the reflection transcript.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.reflection.transcript().await
    }

    /// Recent check-ins, newest first.
    pub async fn recent_activity(&self) -> Vec<ActivityEntry> {
        self.activity.read().await.entries().cloned().collect()
    }

    /// The cached safety contact.
    pub async fn contact(&self) -> Option<SafetyContact> {
        self.state.read().await.contact.clone()
    }

    /// Save an updated safety contact. Empty addresses are silently
    /// rejected like other validation failures.
    pub async fn save_contact(&self, email: &str) -> Result<()> {
        let Some(contact) = SafetyContact::new(email, &self.user_id) else {
            debug!("Ignoring empty safety contact");
            return Ok(());
        };

        self.contacts.save(&contact).await?;

        let mut state = self.state.write().await;
        state.contact = Some(contact);
        info!("Safety contact saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambience::testing::RecordingAmbience;
    use crate::config::ActivityConfig;
    use moodscape_agent::MockBackend;
    use std::time::Duration;

    fn config() -> SessionConfig {
        SessionConfig {
            activity: ActivityConfig::in_memory(),
            ..SessionConfig::default()
        }
    }

    fn orchestrator(backend: MockBackend) -> SessionOrchestrator {
        SessionOrchestrator::with_config(Arc::new(backend), config())
    }

    #[tokio::test]
    async fn test_overwhelmed_check_in_scenario() {
        let session = orchestrator(MockBackend::default().with_mood(Mood::Overwhelmed));

        let outcome = session
            .submit_check_in("I can't cope with anything today")
            .await;
        assert_eq!(outcome, CheckInOutcome::Started(Mood::Overwhelmed));
        assert_eq!(session.view().await, View::Ritual);

        let script = session.ritual_script().await.unwrap();
        assert_eq!(script.title, "5-4-3-2-1 Grounding");
        assert_eq!(script.len(), 5);

        assert!(session.distress_banner().await);

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 1);
        assert!(transcript[0].text.contains("overwhelmed"));

        let activity = session.recent_activity().await;
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].mood, Mood::Overwhelmed);
        assert_eq!(activity[0].excerpt, "I can't cope with anything today");
    }

    #[tokio::test]
    async fn test_empty_check_in_is_silent() {
        let backend = Arc::new(MockBackend::default());
        let session =
            SessionOrchestrator::with_config(backend.clone() as Arc<dyn SupportBackend>, config());

        let outcome = session.submit_check_in("   ").await;
        assert_eq!(outcome, CheckInOutcome::Ignored);
        assert_eq!(session.view().await, View::Intake);
        assert_eq!(backend.infer_calls(), 0);
        assert!(session.recent_activity().await.is_empty());
    }

    #[tokio::test]
    async fn test_inference_failure_stays_in_intake() {
        let backend = MockBackend::default();
        backend.fail_next();
        let session = orchestrator(backend);

        let outcome = session.submit_check_in("rough day").await;
        assert_eq!(outcome, CheckInOutcome::Failed);
        assert_eq!(session.view().await, View::Intake);
        assert_eq!(session.mood().await, None);
        assert!(session.recent_activity().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_script_handled_as_failure() {
        let session = orchestrator(MockBackend::default().with_mood(Mood::Calm))
            .with_catalog(Arc::new(RitualCatalog::empty()));

        let outcome = session.submit_check_in("feeling fine").await;
        assert_eq!(outcome, CheckInOutcome::Failed);
        assert_eq!(session.view().await, View::Intake);
        assert_eq!(session.mood().await, None);
    }

    #[tokio::test]
    async fn test_activity_log_keeps_five_newest() {
        let session = orchestrator(MockBackend::default().with_mood(Mood::Calm));

        for i in 0..7 {
            let outcome = session.submit_check_in(&format!("check-in number {i}")).await;
            assert_eq!(outcome, CheckInOutcome::Started(Mood::Calm));
        }

        let activity = session.recent_activity().await;
        assert_eq!(activity.len(), 5);
        let excerpts: Vec<&str> = activity.iter().map(|e| e.excerpt.as_str()).collect();
        assert_eq!(
            excerpts,
            vec![
                "check-in number 6",
                "check-in number 5",
                "check-in number 4",
                "check-in number 3",
                "check-in number 2"
            ]
        );
    }

    #[tokio::test]
    async fn test_view_transitions_preserve_state() {
        let session = orchestrator(MockBackend::default().with_mood(Mood::Low));
        session.submit_check_in("feeling down").await;
        session.complete_current_step().await.unwrap();

        session.open_reflection().await.unwrap();
        assert_eq!(session.view().await, View::Reflection);
        session.send_reflection("can we talk?").await.unwrap();

        session.back_to_ritual().await.unwrap();
        assert_eq!(session.view().await, View::Ritual);

        // Both transcript and ritual progress survived the round trip
        assert_eq!(session.transcript().await.len(), 3);
        let progress = session.ritual_progress().await;
        assert_eq!(progress.current_step, 1);
        assert!(progress.completed.contains(&0));
    }

    #[tokio::test]
    async fn test_reflection_requires_active_mood() {
        let session = orchestrator(MockBackend::default());
        assert!(matches!(
            session.open_reflection().await,
            Err(SessionError::NoActiveMood)
        ));
        assert!(matches!(
            session.send_reflection("hello").await,
            Err(SessionError::NoActiveMood)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_ritual_with_autoplay() {
        let ambience = Arc::new(RecordingAmbience::default());
        let session = orchestrator(MockBackend::default().with_mood(Mood::Sad))
            .with_ambience(ambience.clone());

        session.submit_check_in("everything hurts").await;
        session.toggle_autoplay().await.unwrap();

        session.reset().await;
        assert_eq!(session.view().await, View::Intake);
        assert_eq!(session.mood().await, None);
        assert!(session.transcript().await.is_empty());
        assert!(!session.distress_banner().await);

        // A stale timer firing must not touch the fresh session
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        session.submit_check_in("trying again").await;
        let progress = session.ritual_progress().await;
        assert_eq!(progress.current_step, 0);
        assert!(progress.completed.is_empty());
        assert!(!progress.autoplay);

        let changes = ambience.changes.lock().unwrap().clone();
        assert_eq!(changes, vec![Some(Mood::Sad), None, Some(Mood::Sad)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_inference_result_discarded() {
        let backend = MockBackend::default()
            .with_mood(Mood::Anxious)
            .with_latency(Duration::from_millis(50));
        let session = Arc::new(orchestrator(backend));

        let pending = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit_check_in("worried about tomorrow").await })
        };
        tokio::task::yield_now().await;

        session.reset().await;

        let outcome = pending.await.unwrap();
        assert_eq!(outcome, CheckInOutcome::Superseded);
        assert_eq!(session.view().await, View::Intake);
        assert_eq!(session.mood().await, None);
        assert!(session.recent_activity().await.is_empty());
    }

    #[tokio::test]
    async fn test_contact_load_and_save() {
        let store = Arc::new(MemoryContactStore::with_contact(
            SafetyContact::new("friend@example.com", "user-1").unwrap(),
        ));
        let session = orchestrator(MockBackend::default())
            .with_contacts(store.clone() as Arc<dyn ContactStore>)
            .with_user("user-1");

        session.initialize().await;
        assert_eq!(
            session.contact().await.unwrap().email,
            "friend@example.com"
        );

        session.save_contact("sibling@example.com").await.unwrap();
        assert_eq!(
            session.contact().await.unwrap().email,
            "sibling@example.com"
        );
        assert_eq!(
            store.load("user-1").await.unwrap().unwrap().email,
            "sibling@example.com"
        );

        // Empty address is silently ignored
        session.save_contact("  ").await.unwrap();
        assert_eq!(
            session.contact().await.unwrap().email,
            "sibling@example.com"
        );
    }
}
