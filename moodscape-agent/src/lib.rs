//! MoodScape Agent - Remote Support-Service Boundary
//!
//! Provides the client-side boundary to the two remote calls the session
//! core depends on:
//! - Mood inference: free text in, one mood identifier out
//! - Reflection exchange: chat turn in, reply plus optional safety action out
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          SessionOrchestrator            │
//! │        (moodscape-session crate)        │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │SupportBackend│      │ ContactStore│
//! │ (Http/Mock) │       │ (remote per-│
//! │             │       │  user store)│
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod contact;
pub mod message;

// Re-export main types for convenience
pub use backend::http::HttpBackend;
pub use backend::mock::MockBackend;
pub use backend::traits::{
    BackendError, ExchangeRequest, ExchangeResponse, SafetyAction, SupportBackend,
};
pub use contact::{ContactStore, MemoryContactStore, SafetyContact};
pub use message::{ChatMessage, Sender};
