//! Bounded record of what was said during a session.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Narrator,
    Player,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
}

/// The opening narration plus the most recent exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    opening: String,
    entries: VecDeque<TranscriptEntry>,
    max_history: usize,
}

impl Transcript {
    pub fn new(opening: impl Into<String>, max_history: usize) -> Self {
        Self {
            opening: opening.into(),
            entries: VecDeque::new(),
            max_history,
        }
    }

    /// The opening narration. Never trimmed.
    pub fn opening(&self) -> &str {
        &self.opening
    }

    pub fn entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Change the history bound, dropping the oldest entries past it.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history;
        self.trim();
    }

    pub fn push(&mut self, speaker: Speaker, content: impl Into<String>) {
        self.entries.push_back(TranscriptEntry {
            speaker,
            content: content.into(),
        });
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
    }

    /// Write the transcript as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
