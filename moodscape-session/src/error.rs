//! Error types for the session core.
//!
//! Remote-call failures never surface here: they are caught at the call
//! site and converted to local state plus a user-visible notice. These
//! variants cover caller contract violations and local defects only.

use catalog::Mood;
use moodscape_agent::BackendError;

/// Error types for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Backend error surfaced outside a notice-converting call site
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Inferred mood has no registered ritual script
    #[error("No ritual script registered for mood {0}")]
    MissingScript(Mood),

    /// Step navigation outside the script bounds
    #[error("Step index {index} out of range for {len}-step ritual")]
    StepOutOfRange { index: usize, len: usize },

    /// A ritual operation was issued with no active ritual
    #[error("No active ritual")]
    NoActiveRitual,

    /// A transition was requested that needs an active mood
    #[error("No active mood")]
    NoActiveMood,
}

pub type Result<T> = std::result::Result<T, SessionError>;
