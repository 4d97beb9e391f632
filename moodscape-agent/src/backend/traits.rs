//! Core trait for remote support services.
//!
//! This module defines `SupportBackend` - the abstraction over the remote
//! mood-inference and reflection-exchange calls that form the system
//! boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use catalog::Mood;

use crate::message::ChatMessage;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error types for remote support-service calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Backend is not available
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed with a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Inference returned an identifier outside the closed mood set
    #[error("Unknown mood identifier: {0}")]
    UnknownMood(String),
}

/// Core trait for the remote support services.
///
/// Both calls are opaque remote operations: the backend decides what the
/// mood is and what the reply says; the caller only trusts the result
/// shape. The safety-escalation decision in particular is made entirely
/// server-side and only surfaced through [`ExchangeResponse::action`].
#[async_trait]
pub trait SupportBackend: Send + Sync {
    /// Get the backend identifier.
    fn id(&self) -> &str;

    /// Check if the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Infer a mood category from raw check-in text.
    async fn infer_mood(&self, text: &str) -> Result<Mood, BackendError>;

    /// Run one reflection exchange turn.
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse, BackendError>;
}

/// Request for one reflection exchange turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ExchangeRequest {
    /// The new user text for this turn
    pub text: String,
    /// The session's active mood
    pub mood: Mood,
    /// Bounded conversational context, most recent last, inclusive of the
    /// just-added user message
    pub history: Vec<ChatMessage>,
    /// Identity of the user, if signed in
    pub user_email: Option<String>,
    /// Safety-contact address the service may alert
    pub emergency_email: Option<String>,
}

impl ExchangeRequest {
    /// Create a request for a turn with no context or contact metadata.
    pub fn new(text: impl Into<String>, mood: Mood) -> Self {
        Self {
            text: text.into(),
            mood,
            history: Vec::new(),
            user_email: None,
            emergency_email: None,
        }
    }

    /// Attach the recent transcript window.
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Attach identity and safety-contact metadata.
    pub fn with_contact(
        mut self,
        user_email: Option<String>,
        emergency_email: Option<String>,
    ) -> Self {
        self.user_email = user_email;
        self.emergency_email = emergency_email;
        self
    }
}

/// A side-effecting safety action the service reports having taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SafetyAction {
    /// An alert email was dispatched to the safety contact
    EmailSent,
}

/// Response from one reflection exchange turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ExchangeResponse {
    /// Assistant reply text
    pub reply: String,
    /// Safety action already taken server-side, if any
    pub action: Option<SafetyAction>,
}

impl ExchangeResponse {
    /// Create a plain reply with no safety action.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            action: None,
        }
    }

    /// Whether the service reports having dispatched a safety alert.
    pub fn alert_dispatched(&self) -> bool {
        self.action == Some(SafetyAction::EmailSent)
    }
}
