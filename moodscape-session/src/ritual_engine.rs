//! Ritual progression engine.
//!
//! Owns the step index, completed-step set and autoplay timer for one
//! active ritual instance. The autoplay timer is a spawned task guarded by
//! an epoch counter: every state-changing operation cancels the task and
//! bumps the epoch, and a firing timer re-checks the epoch under the lock
//! before applying, so a stale firing can never act on superseded state.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use catalog::{Mood, RitualCatalog, RitualScript};

use crate::error::{Result, SessionError};

/// Progress through one ritual instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RitualProgress {
    /// Index of the step the user is on
    pub current_step: usize,
    /// Steps the user has finished (always a subset of the step range)
    pub completed: BTreeSet<usize>,
    /// Whether timed auto-advancement is running
    pub autoplay: bool,
}

impl RitualProgress {
    fn reset() -> Self {
        Self {
            current_step: 0,
            completed: BTreeSet::new(),
            autoplay: false,
        }
    }
}

struct EngineState {
    mood: Option<Mood>,
    script: Option<RitualScript>,
    progress: RitualProgress,
    /// Bumped on every state change; a timer firing for an older epoch
    /// must not apply
    epoch: u64,
}

impl EngineState {
    fn last_step(&self) -> Option<usize> {
        self.script.as_ref().map(RitualScript::last_step)
    }

    /// Mark the pre-advance step completed and move forward one step.
    fn advance(&mut self) {
        self.progress.completed.insert(self.progress.current_step);
        self.progress.current_step += 1;
        self.epoch += 1;
    }
}

/// Timed/interactive progression through one coping ritual.
pub struct RitualEngine {
    catalog: Arc<RitualCatalog>,
    state: Arc<RwLock<EngineState>>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    interval: Duration,
}

impl RitualEngine {
    /// Create an engine over a script catalog.
    pub fn new(catalog: Arc<RitualCatalog>, autoplay_interval: Duration) -> Self {
        Self {
            catalog,
            state: Arc::new(RwLock::new(EngineState {
                mood: None,
                script: None,
                progress: RitualProgress::reset(),
                epoch: 0,
            })),
            timer: Arc::new(Mutex::new(None)),
            interval: autoplay_interval,
        }
    }

    /// Begin the ritual for a mood: step 0, nothing completed, autoplay off.
    ///
    /// A mood with no registered script is a configuration defect; the
    /// engine changes no state and returns the error for the caller to map.
    pub async fn start(&self, mood: Mood) -> Result<()> {
        let script = self
            .catalog
            .script(mood)
            .cloned()
            .ok_or(SessionError::MissingScript(mood))?;

        self.cancel_timer().await;

        let mut state = self.state.write().await;
        state.mood = Some(mood);
        state.script = Some(script);
        state.progress = RitualProgress::reset();
        state.epoch += 1;

        debug!(%mood, "Ritual started");
        Ok(())
    }

    /// Flip autoplay.
    ///
    /// Turning it on arms the step timer unless the current step is the
    /// last, in which case it immediately disables itself again. Turning
    /// it off cancels any pending firing.
    pub async fn toggle_autoplay(&self) -> Result<()> {
        self.cancel_timer().await;

        let arm = {
            let mut state = self.state.write().await;
            let last = state.last_step().ok_or(SessionError::NoActiveRitual)?;
            state.epoch += 1;

            if state.progress.autoplay {
                state.progress.autoplay = false;
                false
            } else if state.progress.current_step < last {
                state.progress.autoplay = true;
                true
            } else {
                // On the last step autoplay has nothing to advance to
                state.progress.autoplay = false;
                false
            }
        };

        if arm {
            self.arm_timer().await;
        }
        Ok(())
    }

    /// Jump to a step directly. Cancels autoplay; never touches the
    /// completed set.
    pub async fn go_to_step(&self, index: usize) -> Result<()> {
        self.cancel_timer().await;

        let mut state = self.state.write().await;
        let last = state.last_step().ok_or(SessionError::NoActiveRitual)?;
        if index > last {
            return Err(SessionError::StepOutOfRange {
                index,
                len: last + 1,
            });
        }

        state.progress.autoplay = false;
        state.progress.current_step = index;
        state.epoch += 1;
        Ok(())
    }

    /// Mark the current step completed and advance, unless already on the
    /// last step (then only the completion mark applies).
    ///
    /// If autoplay is running it keeps running: the timer re-arms for the
    /// new step, or disables itself when the advance lands on the last one.
    pub async fn complete_current_step(&self) -> Result<()> {
        self.cancel_timer().await;

        let rearm = {
            let mut state = self.state.write().await;
            let last = state.last_step().ok_or(SessionError::NoActiveRitual)?;

            if state.progress.current_step < last {
                state.advance();
            } else {
                let current = state.progress.current_step;
                state.progress.completed.insert(current);
                state.epoch += 1;
            }

            if state.progress.autoplay && state.progress.current_step >= last {
                state.progress.autoplay = false;
            }
            state.progress.autoplay
        };

        if rearm {
            self.arm_timer().await;
        }
        Ok(())
    }

    /// Restart the active ritual from step 0 with autoplay enabled.
    pub async fn restart(&self) -> Result<()> {
        self.cancel_timer().await;

        let arm = {
            let mut state = self.state.write().await;
            let last = state.last_step().ok_or(SessionError::NoActiveRitual)?;
            state.progress = RitualProgress::reset();
            state.progress.autoplay = last > 0;
            state.epoch += 1;
            state.progress.autoplay
        };

        if arm {
            self.arm_timer().await;
        }
        Ok(())
    }

    /// Discard the active ritual entirely.
    pub async fn reset(&self) {
        self.cancel_timer().await;

        let mut state = self.state.write().await;
        state.mood = None;
        state.script = None;
        state.progress = RitualProgress::reset();
        state.epoch += 1;
    }

    /// Snapshot of the current progress.
    pub async fn progress(&self) -> RitualProgress {
        self.state.read().await.progress.clone()
    }

    /// The active mood, if a ritual is running.
    pub async fn mood(&self) -> Option<Mood> {
        self.state.read().await.mood
    }

    /// The active script, if a ritual is running.
    pub async fn script(&self) -> Option<RitualScript> {
        self.state.read().await.script.clone()
    }

    async fn cancel_timer(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }

    /// Spawn the autoplay loop for the current epoch.
    async fn arm_timer(&self) {
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        let mut armed_epoch = state.read().await.epoch;

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let mut state = state.write().await;
                if state.epoch != armed_epoch || !state.progress.autoplay {
                    // Superseded by a manual operation
                    return;
                }
                let Some(last) = state.last_step() else {
                    warn!("Autoplay timer fired with no active script");
                    return;
                };
                if state.progress.current_step >= last {
                    state.progress.autoplay = false;
                    state.epoch += 1;
                    return;
                }

                state.advance();
                armed_epoch = state.epoch;
                debug!(step = state.progress.current_step, "Autoplay advanced");

                if state.progress.current_step >= last {
                    state.progress.autoplay = false;
                    state.epoch += 1;
                    return;
                }
            }
        });

        let mut timer = self.timer.lock().await;
        if let Some(old) = timer.replace(handle) {
            old.abort();
        }
    }
}

impl Drop for RitualEngine {
    fn drop(&mut self) {
        // Teardown cancels any pending firing
        if let Ok(mut timer) = self.timer.try_lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}
