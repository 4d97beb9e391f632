//! Mock support-service backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use catalog::Mood;

use super::traits::*;

/// Mock backend for testing.
///
/// Configurable mood, scripted replies, failure injection and latency for
/// unit tests of the session core.
pub struct MockBackend {
    id: String,
    available: AtomicBool,
    mood: Mutex<Mood>,
    replies: Mutex<VecDeque<ExchangeResponse>>,
    default_reply: String,
    latency: Option<Duration>,
    fail_next: AtomicBool,
    infer_calls: AtomicU32,
    exchange_calls: AtomicU32,
    last_request: Mutex<Option<ExchangeRequest>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            available: AtomicBool::new(true),
            mood: Mutex::new(Mood::Calm),
            replies: Mutex::new(VecDeque::new()),
            default_reply: "I'm listening.".to_string(),
            latency: None,
            fail_next: AtomicBool::new(false),
            infer_calls: AtomicU32::new(0),
            exchange_calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Set the mood every inference returns.
    pub fn with_mood(self, mood: Mood) -> Self {
        *self.mood.lock().unwrap() = mood;
        self
    }

    /// Queue a scripted reply for the next exchange.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(ExchangeResponse::reply(text));
        self
    }

    /// Queue a reply that carries a dispatched safety action.
    pub fn with_alert_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(ExchangeResponse {
            reply: text.into(),
            action: Some(SafetyAction::EmailSent),
        });
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Add artificial latency before every remote call completes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with a network error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of inference calls made.
    pub fn infer_calls(&self) -> u32 {
        self.infer_calls.load(Ordering::SeqCst)
    }

    /// Number of exchange calls made.
    pub fn exchange_calls(&self) -> u32 {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// The most recent exchange request, for asserting on context windows.
    pub fn last_request(&self) -> Option<ExchangeRequest> {
        self.last_request.lock().unwrap().clone()
    }

    async fn simulate(&self) -> Result<(), BackendError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("Mock backend disabled".to_string()));
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(BackendError::NetworkError("Injected failure".to_string()));
        }
        Ok(())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-support")
    }
}

#[async_trait]
impl SupportBackend for MockBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn infer_mood(&self, _text: &str) -> Result<Mood, BackendError> {
        self.infer_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        Ok(*self.mood.lock().unwrap())
    }

    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse, BackendError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        self.simulate().await?;

        let scripted = self.replies.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| ExchangeResponse::reply(&self.default_reply)))
    }
}
