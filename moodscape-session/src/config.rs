//! Configuration for the session core.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one session orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session ID
    pub session_id: String,
    /// Ritual engine configuration
    pub ritual: RitualConfig,
    /// Reflection session configuration
    pub reflection: ReflectionConfig,
    /// Recent-activity log configuration
    pub activity: ActivityConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            ritual: RitualConfig::default(),
            reflection: ReflectionConfig::default(),
            activity: ActivityConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a new config with a session ID.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Ritual engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RitualConfig {
    /// Autoplay step delay (ms)
    pub autoplay_interval_ms: u64,
}

impl RitualConfig {
    /// Autoplay delay as a Duration.
    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }
}

impl Default for RitualConfig {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: 5_000,
        }
    }
}

/// Reflection session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionConfig {
    /// Transcript messages sent as conversational context
    pub context_window: usize,
    /// Assistant message appended when the exchange call fails
    pub error_notice: String,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            context_window: 5,
            error_notice: "Connection error.".to_string(),
        }
    }
}

/// Recent-activity log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Maximum retained entries (oldest evicted)
    pub capacity: usize,
    /// Maximum excerpt length in characters before the ellipsis marker
    pub excerpt_chars: usize,
    /// Durable storage path; None keeps the log in memory only
    pub storage_path: Option<PathBuf>,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            excerpt_chars: 50,
            storage_path: Some(PathBuf::from("mood_history.json")),
        }
    }
}

impl ActivityConfig {
    /// In-memory configuration for tests.
    pub fn in_memory() -> Self {
        Self {
            storage_path: None,
            ..Default::default()
        }
    }
}
