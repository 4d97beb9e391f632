//! Mood Catalog for MoodScape
//!
//! Static data shared by the session core:
//!
//! - [`Mood`]: the closed set of mood categories a check-in can resolve to
//! - [`RitualScript`]: the ordered coping steps attached to one mood
//! - [`RitualCatalog`]: the mood → script table
//!
//! Everything in this crate is immutable at runtime. Scripts and per-mood
//! presentation metadata come from the product's fixed content tables; the
//! session layer only ever reads them.

pub mod mood;
pub mod ritual;

// Re-export main types
pub use mood::{Mood, UnknownMood};
pub use ritual::{RitualCatalog, RitualScript};
