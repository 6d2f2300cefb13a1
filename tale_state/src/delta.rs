//! State deltas: descriptions of how a session should change after a choice.

use serde::{Deserialize, Serialize};

use crate::entities::{ItemId, LocationId, NpcId};

/// A single change to session state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Change {
    /// Move the player. The destination becomes visited.
    Travel(LocationId),

    /// Learn that a location exists without going there.
    RevealLocation(LocationId),

    /// See an item.
    DiscoverItem(ItemId),

    /// Put an item in the inventory.
    AcquireItem(ItemId),

    /// Take an item out of the inventory. It stays discovered.
    ReleaseItem(ItemId),

    /// Learn a piece of lore.
    LearnLore(String),

    /// Meet an NPC, starting from their authored disposition.
    MeetNpc(NpcId),

    /// Shift an NPC's disposition either way.
    AdjustDisposition { npc: NpcId, amount: i32 },
}

/// An ordered list of changes applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateDelta {
    changes: Vec<Change>,
}

impl StateDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change.
    pub fn with(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    /// Append several changes.
    pub fn with_all(mut self, changes: impl IntoIterator<Item = Change>) -> Self {
        self.changes.extend(changes);
        self
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// A copy of this delta with the change at `index` removed.
    pub fn without(&self, index: usize) -> Self {
        let changes = self
            .changes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, change)| change.clone())
            .collect();
        Self { changes }
    }
}

impl FromIterator<Change> for StateDelta {
    fn from_iter<T: IntoIterator<Item = Change>>(iter: T) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_builder() {
        let delta = StateDelta::new()
            .with(Change::DiscoverItem(ItemId::new("cup")))
            .with_all([
                Change::AcquireItem(ItemId::new("cup")),
                Change::LearnLore("Cups hold tea.".into()),
            ]);

        assert_eq!(delta.len(), 3);
        assert!(!delta.is_empty());
        assert_eq!(delta.changes()[1], Change::AcquireItem(ItemId::new("cup")));
    }

    #[test]
    fn test_delta_without() {
        let delta: StateDelta = [
            Change::RevealLocation(LocationId::new("a")),
            Change::RevealLocation(LocationId::new("b")),
            Change::RevealLocation(LocationId::new("c")),
        ]
        .into_iter()
        .collect();

        let trimmed = delta.without(1);
        assert_eq!(
            trimmed.changes(),
            &[
                Change::RevealLocation(LocationId::new("a")),
                Change::RevealLocation(LocationId::new("c")),
            ]
        );
        assert_eq!(delta.len(), 3);
    }
}
