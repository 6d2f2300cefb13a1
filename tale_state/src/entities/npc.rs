//! NPC disposition tracking.

use serde::{Deserialize, Serialize};

/// How an NPC feels about the player, from -100 (hostile) to 100 (devoted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i32", into = "i32")]
pub struct Disposition(i32);

impl From<i32> for Disposition {
    fn from(score: i32) -> Self {
        Self::new(score)
    }
}

impl From<Disposition> for i32 {
    fn from(disposition: Disposition) -> Self {
        disposition.0
    }
}

impl Disposition {
    pub const MIN: i32 = -100;
    pub const MAX: i32 = 100;

    /// Create a disposition, clamped to the valid range.
    pub fn new(score: i32) -> Self {
        Self(score.clamp(Self::MIN, Self::MAX))
    }

    /// The raw score.
    pub fn score(&self) -> i32 {
        self.0
    }

    /// Shift the score by `amount` in either direction.
    pub fn adjust(&mut self, amount: i32) {
        self.0 = self.0.saturating_add(amount).clamp(Self::MIN, Self::MAX);
    }

    /// Coarse attitude bucket for narration.
    pub fn attitude(&self) -> Attitude {
        match self.0 {
            i32::MIN..=-50 => Attitude::Hostile,
            -49..=-11 => Attitude::Wary,
            -10..=10 => Attitude::Neutral,
            11..=49 => Attitude::Friendly,
            _ => Attitude::Devoted,
        }
    }
}

/// Attitude buckets derived from a disposition score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attitude {
    Hostile,
    Wary,
    Neutral,
    Friendly,
    Devoted,
}

impl Attitude {
    /// Whether the NPC is willing to share confidences.
    pub fn is_warm(&self) -> bool {
        matches!(self, Attitude::Friendly | Attitude::Devoted)
    }
}

impl std::fmt::Display for Attitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            Attitude::Hostile => "hostile",
            Attitude::Wary => "wary",
            Attitude::Neutral => "neutral",
            Attitude::Friendly => "friendly",
            Attitude::Devoted => "devoted",
        };
        f.write_str(word)
    }
}
