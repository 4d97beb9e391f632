//! Reflection (chat) session.
//!
//! Owns the ordered transcript and drives the remote exchange for each
//! turn. Sends are single-flight: a turn lock serializes them in issue
//! order, so the i-th assistant reply always answers the i-th user
//! message. The safety-escalation decision is made server-side; this
//! module only surfaces it, exactly once per triggering turn.

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use catalog::Mood;
use moodscape_agent::{ChatMessage, ExchangeRequest, SafetyContact, SupportBackend};

use crate::config::ReflectionConfig;

/// Outcome of one reflection turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Assistant reply appended; `alert_dispatched` is the one-time signal
    /// that the service notified the safety contact this turn
    Replied { alert_dispatched: bool },
    /// Exchange failed; a connection-error notice was appended instead
    Failed,
    /// Empty input, nothing happened
    Ignored,
}

/// Conversational reflection scoped to one active mood.
pub struct ReflectionSession {
    backend: Arc<dyn SupportBackend>,
    transcript: Arc<RwLock<Vec<ChatMessage>>>,
    /// Serializes turns so replies apply in issue order
    turn: Mutex<()>,
    config: ReflectionConfig,
}

impl ReflectionSession {
    /// Create a session over a support backend.
    pub fn new(backend: Arc<dyn SupportBackend>, config: ReflectionConfig) -> Self {
        Self {
            backend,
            transcript: Arc::new(RwLock::new(Vec::new())),
            turn: Mutex::new(()),
            config,
        }
    }

    /// Replace the transcript with the scripted opening line for a mood.
    pub async fn seed_greeting(&self, mood: Mood) {
        let greeting = format!(
            "I sense you're feeling {}. Let's work through this together.",
            mood.as_str().to_lowercase()
        );
        let mut transcript = self.transcript.write().await;
        transcript.clear();
        transcript.push(ChatMessage::assistant(greeting));
    }

    /// Send one user turn and append the reply.
    ///
    /// The user message is appended before the request goes out; the
    /// assistant message (reply or error notice) is appended when that
    /// specific response returns. The transcript is never left without a
    /// response to a sent user message.
    pub async fn send(
        &self,
        text: &str,
        mood: Mood,
        contact: Option<&SafetyContact>,
    ) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let _turn = self.turn.lock().await;

        let history = {
            let mut transcript = self.transcript.write().await;
            transcript.push(ChatMessage::user(text));
            let window = transcript.len().saturating_sub(self.config.context_window);
            transcript[window..].to_vec()
        };

        let request = ExchangeRequest::new(text, mood)
            .with_history(history)
            .with_contact(
                contact.map(|c| c.owner_user_id.clone()),
                contact.map(|c| c.email.clone()),
            );

        match self.backend.exchange(request).await {
            Ok(response) => {
                let alert_dispatched = response.alert_dispatched();
                let mut transcript = self.transcript.write().await;
                transcript.push(ChatMessage::assistant(response.reply));

                if alert_dispatched {
                    warn!("Safety alert dispatched to emergency contact");
                }
                SendOutcome::Replied { alert_dispatched }
            }
            Err(e) => {
                debug!(error = %e, "Reflection exchange failed");
                let mut transcript = self.transcript.write().await;
                transcript.push(ChatMessage::assistant(self.config.error_notice.clone()));
                SendOutcome::Failed
            }
        }
    }

    /// Clear the transcript for a new check-in.
    pub async fn clear(&self) {
        self.transcript.write().await.clear();
    }

    /// Snapshot of the transcript, oldest first.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    /// Number of transcript messages.
    pub async fn len(&self) -> usize {
        self.transcript.read().await.len()
    }

    /// Whether the transcript is empty.
    pub async fn is_empty(&self) -> bool {
        self.transcript.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodscape_agent::{MockBackend, Sender};

    fn session(backend: MockBackend) -> ReflectionSession {
        ReflectionSession::new(Arc::new(backend), ReflectionConfig::default())
    }

    #[tokio::test]
    async fn test_greeting_references_mood() {
        let session = session(MockBackend::default());
        session.seed_greeting(Mood::Overwhelmed).await;

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].sender, Sender::Assistant);
        assert!(transcript[0].text.contains("overwhelmed"));
    }

    #[tokio::test]
    async fn test_empty_send_is_ignored() {
        let session = session(MockBackend::default());
        let outcome = session.send("   ", Mood::Calm, None).await;
        assert_eq!(outcome, SendOutcome::Ignored);
        assert!(session.is_empty().await);
    }

    #[tokio::test]
    async fn test_reply_ordering() {
        let backend = MockBackend::default()
            .with_reply("reply one")
            .with_reply("reply two")
            .with_reply("reply three");
        let session = session(backend);

        for text in ["turn one", "turn two", "turn three"] {
            let outcome = session.send(text, Mood::Sad, None).await;
            assert_eq!(
                outcome,
                SendOutcome::Replied {
                    alert_dispatched: false
                }
            );
        }

        let transcript = session.transcript().await;
        let texts: Vec<&str> = transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "turn one",
                "reply one",
                "turn two",
                "reply two",
                "turn three",
                "reply three"
            ]
        );
    }

    #[tokio::test]
    async fn test_context_window_includes_new_message() {
        let backend = Arc::new(MockBackend::default());
        let session = ReflectionSession::new(
            backend.clone() as Arc<dyn SupportBackend>,
            ReflectionConfig {
                context_window: 5,
                ..ReflectionConfig::default()
            },
        );

        session.seed_greeting(Mood::Low).await;
        for i in 0..4 {
            session.send(&format!("turn {i}"), Mood::Low, None).await;
        }

        // 9 messages in the transcript; only the last 5 (ending with the
        // just-sent user turn) went out as context
        assert_eq!(session.transcript().await.len(), 9);

        let request = backend.last_request().unwrap();
        assert_eq!(request.history.len(), 5);
        let last = request.history.last().unwrap();
        assert!(last.is_user());
        assert_eq!(last.text, "turn 3");
    }

    #[tokio::test]
    async fn test_alert_surfaced_once_with_reply_kept() {
        let backend = MockBackend::default()
            .with_alert_reply("You are not alone. Help is on the way.")
            .with_reply("Tell me more.");
        let session = session(backend);

        let first = session.send("I can't go on", Mood::Sad, None).await;
        assert_eq!(
            first,
            SendOutcome::Replied {
                alert_dispatched: true
            }
        );

        // The reply text is still in the transcript
        let transcript = session.transcript().await;
        assert_eq!(transcript[1].text, "You are not alone. Help is on the way.");

        // The next turn carries no alert
        let second = session.send("thank you", Mood::Sad, None).await;
        assert_eq!(
            second,
            SendOutcome::Replied {
                alert_dispatched: false
            }
        );
    }

    #[tokio::test]
    async fn test_failure_appends_error_notice() {
        let backend = MockBackend::default();
        backend.fail_next();
        let session = session(backend);

        let outcome = session.send("hello?", Mood::Anxious, None).await;
        assert_eq!(outcome, SendOutcome::Failed);

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].sender, Sender::User);
        assert_eq!(transcript[1].sender, Sender::Assistant);
        assert_eq!(transcript[1].text, "Connection error.");
    }

    #[tokio::test]
    async fn test_contact_metadata_forwarded() {
        let backend = Arc::new(MockBackend::default());
        let session = ReflectionSession::new(backend.clone(), ReflectionConfig::default());

        let contact = SafetyContact::new("friend@example.com", "user-1").unwrap();
        session.send("hi", Mood::Low, Some(&contact)).await;

        let request = backend.last_request().unwrap();
        assert_eq!(request.emergency_email.as_deref(), Some("friend@example.com"));
        assert_eq!(request.user_email.as_deref(), Some("user-1"));
        assert_eq!(request.history.len(), 1);
    }
}
