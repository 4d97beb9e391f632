//! Ritual scripts and the mood → script table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::mood::Mood;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// An ordered sequence of short coping instructions for one mood.
///
/// Scripts are static content: never mutated at runtime, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RitualScript {
    /// Display title of the ritual
    pub title: String,
    /// Ordered instruction steps
    pub steps: Vec<String>,
}

impl RitualScript {
    /// Create a script from a title and steps.
    pub fn new(title: impl Into<String>, steps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            title: title.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step.
    pub fn last_step(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Static table mapping each mood to its ritual script.
#[derive(Debug, Clone)]
pub struct RitualCatalog {
    scripts: HashMap<Mood, RitualScript>,
}

impl RitualCatalog {
    /// Build the catalog with the product's default scripts.
    pub fn build_defaults() -> Self {
        let mut scripts = HashMap::new();

        scripts.insert(
            Mood::Anxious,
            RitualScript::new(
                "4-7-8 Breathing",
                [
                    "Sit comfortably",
                    "Inhale through nose (4s)",
                    "Hold breath (7s)",
                    "Exhale slowly (8s)",
                    "Repeat 4 times",
                ],
            ),
        );
        scripts.insert(
            Mood::Overwhelmed,
            RitualScript::new(
                "5-4-3-2-1 Grounding",
                [
                    "Observe your space",
                    "5 things you see",
                    "4 things you touch",
                    "3 sounds you hear",
                    "2 things you smell",
                ],
            ),
        );
        scripts.insert(
            Mood::Low,
            RitualScript::new(
                "Sunlight Visualization",
                [
                    "Close your eyes",
                    "Imagine golden light",
                    "Feel it on your forehead",
                    "Let warmth fill your chest",
                    "Breathe in the energy",
                ],
            ),
        );
        scripts.insert(
            Mood::Sad,
            RitualScript::new(
                "Self-Compassion",
                [
                    "Hand on heart",
                    "Feel your heartbeat",
                    "Take 3 deep breaths",
                    "Say: 'I'm doing my best'",
                    "Say: 'I deserve peace'",
                ],
            ),
        );
        scripts.insert(
            Mood::Energized,
            RitualScript::new(
                "Channel Energy",
                [
                    "Stand and stretch",
                    "Shake it out",
                    "Pick ONE task",
                    "Set 25-min timer",
                    "Begin with intention",
                ],
            ),
        );
        scripts.insert(
            Mood::Calm,
            RitualScript::new(
                "Gratitude Moment",
                [
                    "Notice this peace",
                    "Think of someone special",
                    "Send silent thanks",
                    "Feel the connection",
                    "Smile softly",
                ],
            ),
        );
        scripts.insert(
            Mood::Focused,
            RitualScript::new(
                "Deep Work Ritual",
                [
                    "Silence notifications",
                    "Close extra tabs",
                    "Write your goal",
                    "One centering breath",
                    "Begin focused work",
                ],
            ),
        );

        Self { scripts }
    }

    /// Create an empty catalog (for tests and custom content sets).
    pub fn empty() -> Self {
        Self {
            scripts: HashMap::new(),
        }
    }

    /// Register or replace a script.
    pub fn with_script(mut self, mood: Mood, script: RitualScript) -> Self {
        self.scripts.insert(mood, script);
        self
    }

    /// Look up the script for a mood.
    pub fn script(&self, mood: Mood) -> Option<&RitualScript> {
        self.scripts.get(&mood)
    }

    /// Number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether no scripts are registered.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl Default for RitualCatalog {
    fn default() -> Self {
        Self::build_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mood_has_a_script() {
        let catalog = RitualCatalog::build_defaults();
        for mood in Mood::all() {
            let script = catalog.script(mood).unwrap();
            assert!(!script.is_empty(), "{mood} script has no steps");
            assert!(!script.title.is_empty());
        }
    }

    #[test]
    fn test_grounding_script() {
        let catalog = RitualCatalog::build_defaults();
        let script = catalog.script(Mood::Overwhelmed).unwrap();
        assert_eq!(script.title, "5-4-3-2-1 Grounding");
        assert_eq!(script.len(), 5);
        assert_eq!(script.last_step(), 4);
    }

    #[test]
    fn test_custom_script_override() {
        let catalog = RitualCatalog::empty()
            .with_script(Mood::Calm, RitualScript::new("Short", ["Only step"]));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.script(Mood::Calm).unwrap().last_step(), 0);
        assert!(catalog.script(Mood::Anxious).is_none());
    }
}
