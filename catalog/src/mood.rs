//! Mood categories and per-mood presentation metadata.
//!
//! The mood set is closed: remote inference returns one of these
//! identifiers, and an unrecognized identifier is an inference failure,
//! never a new variant.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for consistency with the web frontend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A mood category inferred from a free-text check-in.
///
/// Serialized with capitalized variant names to match the inference
/// service's wire format (`{"emotion": "Anxious"}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum Mood {
    Anxious,
    Overwhelmed,
    Low,
    Sad,
    Energized,
    Calm,
    Focused,
}

impl Mood {
    /// All moods, in catalog order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Anxious,
            Self::Overwhelmed,
            Self::Low,
            Self::Sad,
            Self::Energized,
            Self::Calm,
            Self::Focused,
        ]
    }

    /// Get the canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxious => "Anxious",
            Self::Overwhelmed => "Overwhelmed",
            Self::Low => "Low",
            Self::Sad => "Sad",
            Self::Energized => "Energized",
            Self::Calm => "Calm",
            Self::Focused => "Focused",
        }
    }

    /// Whether this mood shows the distress support banner.
    pub fn is_distress(&self) -> bool {
        matches!(self, Self::Sad | Self::Overwhelmed | Self::Low)
    }

    /// One-line ambiance text shown while this mood is active.
    pub fn ambiance(&self) -> &'static str {
        match self {
            Self::Anxious => "Calm waves wash over you",
            Self::Overwhelmed => "Ground yourself in this moment",
            Self::Low => "Gentle warmth surrounds you",
            Self::Sad => "You are held and supported",
            Self::Energized => "Channel your vibrant energy",
            Self::Calm => "Peace flows through you",
            Self::Focused => "Clarity sharpens your mind",
        }
    }

    /// Background audio track for this mood.
    ///
    /// No dedicated track exists for Sad; it maps to the calm track.
    pub fn audio_track(&self) -> &'static str {
        match self {
            Self::Anxious => "anxious",
            Self::Overwhelmed => "overwhelmed",
            Self::Low => "low",
            Self::Sad => "calm",
            Self::Energized => "energized",
            Self::Calm => "calm",
            Self::Focused => "focused",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a mood identifier outside the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown mood identifier: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anxious" => Ok(Self::Anxious),
            "overwhelmed" => Ok(Self::Overwhelmed),
            "low" => Ok(Self::Low),
            "sad" => Ok(Self::Sad),
            "energized" => Ok(Self::Energized),
            "calm" => Ok(Self::Calm),
            "focused" => Ok(Self::Focused),
            _ => Err(UnknownMood(s.to_string())),
        }
    }
}
