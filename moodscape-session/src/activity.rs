//! Recent-activity log.
//!
//! A bounded, newest-first record of past check-ins. The log is the only
//! state that survives restarts: it is read once at startup and rewritten
//! on every append. A corrupt or missing file falls back to an empty log
//! without failing startup.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{debug, warn};

use catalog::Mood;

use crate::config::ActivityConfig;

/// One recorded check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Timestamp-derived unique id (epoch millis)
    pub id: i64,
    /// Calendar date the check-in happened, e.g. "Nov 5"
    pub date: String,
    /// Inferred mood
    pub mood: Mood,
    /// Check-in text excerpt, truncated with an ellipsis marker
    pub excerpt: String,
}

impl ActivityEntry {
    /// Create an entry for a check-in made now.
    pub fn new(mood: Mood, text: &str, excerpt_chars: usize) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            date: now.format("%b %-d").to_string(),
            mood,
            excerpt: excerpt(text, excerpt_chars),
        }
    }
}

/// Truncate check-in text to an excerpt of at most `max` characters,
/// appending the ellipsis marker when anything was cut.
fn excerpt(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push_str("...");
    }
    out
}

/// Bounded newest-first log of recent check-ins.
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    storage_path: Option<PathBuf>,
}

impl ActivityLog {
    /// Load the log from durable storage, or start empty.
    pub fn load(config: &ActivityConfig) -> Self {
        let entries = match &config.storage_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<Vec<ActivityEntry>>(&content) {
                    Ok(parsed) => {
                        debug!(entries = parsed.len(), path = %path.display(), "Loaded activity log");
                        parsed.into_iter().take(config.capacity).collect()
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Corrupt activity log, starting empty");
                        VecDeque::new()
                    }
                },
                // Missing file is the normal first-run case
                Err(_) => VecDeque::new(),
            },
            None => VecDeque::new(),
        };

        Self {
            entries,
            capacity: config.capacity,
            storage_path: config.storage_path.clone(),
        }
    }

    /// Record a new check-in at the head, evicting the oldest past capacity.
    pub fn record(&mut self, entry: ActivityEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
        self.persist();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let Some(path) = &self.storage_path else {
            return;
        };

        let entries: Vec<&ActivityEntry> = self.entries.iter().collect();
        match serde_json::to_string(&entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!(path = %path.display(), error = %e, "Failed to persist activity log");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize activity log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("moodscape-activity-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_excerpt_truncation() {
        assert_eq!(excerpt("short", 50), "short");

        let long = "x".repeat(60);
        let cut = excerpt(&long, 50);
        assert_eq!(cut.chars().count(), 53);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_capacity_eviction() {
        let mut log = ActivityLog::load(&ActivityConfig::in_memory());

        for i in 0..8 {
            let mut entry = ActivityEntry::new(Mood::Calm, &format!("check-in {i}"), 50);
            entry.id = i;
            log.record(entry);
        }

        assert_eq!(log.len(), 5);
        // Newest first: ids 7,6,5,4,3
        let ids: Vec<i64> = log.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_persistence_roundtrip() {
        let path = temp_path();
        let config = ActivityConfig {
            storage_path: Some(path.clone()),
            ..ActivityConfig::default()
        };

        {
            let mut log = ActivityLog::load(&config);
            log.record(ActivityEntry::new(Mood::Anxious, "a hard morning", 50));
            log.record(ActivityEntry::new(Mood::Calm, "better now", 50));
        }

        let reloaded = ActivityLog::load(&config);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries().next().unwrap().mood, Mood::Calm);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let path = temp_path();
        std::fs::write(&path, "{not json").unwrap();

        let config = ActivityConfig {
            storage_path: Some(path.clone()),
            ..ActivityConfig::default()
        };
        let log = ActivityLog::load(&config);
        assert!(log.is_empty());

        let _ = std::fs::remove_file(path);
    }
}
