//! Session state - everything a single playthrough has discovered so far.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{Disposition, ItemId, LocationId, NpcId, SessionId};

/// One resolved choice in the session's chronicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    pub turn: u32,
    pub choice: String,
}

/// The evolving state of a session.
///
/// Discovered facts only ever grow: visited and known locations, discovered
/// items, claimed items, lore and met NPCs. The inventory may shrink, but
/// anything it ever held stays discovered. Mutation goes through
/// [`crate::SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) id: SessionId,
    pub(crate) hero: String,
    pub(crate) location: LocationId,
    pub(crate) visited: BTreeSet<LocationId>,
    pub(crate) known_locations: BTreeSet<LocationId>,
    pub(crate) inventory: BTreeSet<ItemId>,
    pub(crate) discovered_items: BTreeSet<ItemId>,
    /// Items that have been picked up at least once.
    pub(crate) claimed_items: BTreeSet<ItemId>,
    pub(crate) lore: BTreeSet<String>,
    pub(crate) npcs: BTreeMap<NpcId, Disposition>,
    pub(crate) chronicle: Vec<ChronicleEntry>,
    pub(crate) turn: u32,
}

impl SessionState {
    /// Create a fresh state standing at `location`.
    pub fn new(id: SessionId, hero: impl Into<String>, location: LocationId) -> Self {
        let visited = BTreeSet::from([location.clone()]);
        let known_locations = visited.clone();
        Self {
            id,
            hero: hero.into(),
            location,
            visited,
            known_locations,
            inventory: BTreeSet::new(),
            discovered_items: BTreeSet::new(),
            claimed_items: BTreeSet::new(),
            lore: BTreeSet::new(),
            npcs: BTreeMap::new(),
            chronicle: Vec::new(),
            turn: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn hero(&self) -> &str {
        &self.hero
    }

    pub fn location(&self) -> &LocationId {
        &self.location
    }

    pub fn visited(&self) -> &BTreeSet<LocationId> {
        &self.visited
    }

    pub fn known_locations(&self) -> &BTreeSet<LocationId> {
        &self.known_locations
    }

    pub fn inventory(&self) -> &BTreeSet<ItemId> {
        &self.inventory
    }

    pub fn discovered_items(&self) -> &BTreeSet<ItemId> {
        &self.discovered_items
    }

    pub fn lore(&self) -> &BTreeSet<String> {
        &self.lore
    }

    pub fn npcs(&self) -> &BTreeMap<NpcId, Disposition> {
        &self.npcs
    }

    pub fn chronicle(&self) -> &[ChronicleEntry] {
        &self.chronicle
    }

    /// Number of choices resolved so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn carries(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    pub fn has_discovered(&self, item: &ItemId) -> bool {
        self.discovered_items.contains(item)
    }

    pub fn has_claimed(&self, item: &ItemId) -> bool {
        self.claimed_items.contains(item)
    }

    pub fn has_visited(&self, location: &LocationId) -> bool {
        self.visited.contains(location)
    }

    pub fn knows_location(&self, location: &LocationId) -> bool {
        self.known_locations.contains(location)
    }

    pub fn knows_lore(&self, lore: &str) -> bool {
        self.lore.contains(lore)
    }

    pub fn has_met(&self, npc: &NpcId) -> bool {
        self.npcs.contains_key(npc)
    }

    /// Disposition of an NPC the player has met.
    pub fn disposition(&self, npc: &NpcId) -> Option<Disposition> {
        self.npcs.get(npc).copied()
    }
}
