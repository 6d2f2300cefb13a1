//! Candidate scoring for the choice presenter.

use std::collections::HashMap;

use crate::choice::Action;

/// Collects candidate actions with a relevance score.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    scores: HashMap<Action, f32>,
}

impl CandidatePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an action. An action offered twice keeps its higher score.
    pub fn offer(&mut self, action: Action, score: f32) {
        let current = self.scores.entry(action).or_insert(score);
        if score > *current {
            *current = score;
        }
    }

    /// Score of an action, or 0.0 if it was never offered.
    pub fn score(&self, action: &Action) -> f32 {
        self.scores.get(action).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All candidates, highest score first. Ties are broken by `tie_key`.
    pub fn ranked<K: Ord>(&self, tie_key: impl Fn(&Action) -> K) -> Vec<(&Action, f32)> {
        let mut ranked: Vec<_> = self.scores.iter().map(|(a, s)| (a, *s)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| tie_key(a.0).cmp(&tie_key(b.0)))
        });
        ranked
    }
}
