//! MoodScape Session Core
//!
//! The session state machine behind a guided emotional-support check-in:
//!
//! - [`RitualEngine`]: timed/interactive progression through one coping
//!   ritual (autoplay, pause/resume, manual navigation, completion set)
//! - [`ReflectionSession`]: the open-ended chat transcript and its
//!   single-flight remote exchange, including safety-alert surfacing
//! - [`SessionOrchestrator`]: the Intake / Ritual / Reflection state
//!   machine composing the two, plus the persisted recent-activity log
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             SessionOrchestrator              │
//! │   Intake ──check_in──▶ Ritual ◀──▶ Reflection│
//! └───────┬──────────────┬───────────────┬───────┘
//!         │              │               │
//!         ▼              ▼               ▼
//!  ┌────────────┐ ┌─────────────┐ ┌──────────────┐
//!  │ ActivityLog│ │ RitualEngine│ │ Reflection   │
//!  │ (persisted,│ │ (autoplay   │ │ Session      │
//!  │  cap 5)    │ │  timer)     │ │ (transcript) │
//!  └────────────┘ └─────────────┘ └──────┬───────┘
//!                                        │
//!                                        ▼
//!                                 SupportBackend
//!                              (moodscape-agent crate)
//! ```

pub mod activity;
pub mod ambience;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reflection;
pub mod ritual_engine;

// Re-export main types for convenience
pub use activity::{ActivityEntry, ActivityLog};
pub use ambience::{AmbiencePlayer, NullAmbience};
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use orchestrator::{CheckInOutcome, SessionOrchestrator, View};
pub use reflection::{ReflectionSession, SendOutcome};
pub use ritual_engine::{RitualEngine, RitualProgress};
