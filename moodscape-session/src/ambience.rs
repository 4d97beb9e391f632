//! Ambient audio collaborator.
//!
//! Playback is an external, best-effort concern: the orchestrator notifies
//! the player on every mood change and never lets a playback problem touch
//! a state transition. Implementations swallow their own failures.

use async_trait::async_trait;

use catalog::Mood;

/// Stateless collaborator notified of mood changes.
#[async_trait]
pub trait AmbiencePlayer: Send + Sync {
    /// Called with the new active mood, or None when the session resets.
    ///
    /// The track for a mood comes from [`Mood::audio_track`].
    async fn mood_changed(&self, mood: Option<Mood>);
}

/// No-op player for headless and test use.
pub struct NullAmbience;

#[async_trait]
impl AmbiencePlayer for NullAmbience {
    async fn mood_changed(&self, _mood: Option<Mood>) {}
}
