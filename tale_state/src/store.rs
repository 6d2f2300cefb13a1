//! The session state store - the only place session state is mutated.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::delta::{Change, StateDelta};
use crate::entities::{Disposition, EntityKind, ItemId, LocationId, NpcId, SessionId};
use crate::state::{ChronicleEntry, SessionState};
use crate::world::{World, WorldError};

/// Which entity kinds must be discovered before a delta may refer to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryRules {
    /// Travel only to locations already known.
    pub locations: bool,
    /// Pick up only items already seen.
    pub items: bool,
    /// Adjust disposition only for NPCs already met.
    pub npcs: bool,
}

impl Default for DiscoveryRules {
    fn default() -> Self {
        Self {
            locations: true,
            items: true,
            npcs: true,
        }
    }
}

/// Why a change could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("the world has no {kind} '{id}'")]
    Unknown { kind: EntityKind, id: String },

    #[error("{kind} '{id}' has not been discovered yet")]
    Undiscovered { kind: EntityKind, id: String },

    #[error("item '{0}' cannot be carried")]
    NotPortable(ItemId),

    #[error("item '{0}' is not being carried")]
    NotCarried(ItemId),
}

/// A delta was invalid against the current state. Nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("change #{index} ({change:?}) conflicts with session state: {reason}")]
pub struct ConflictError {
    /// Position of the offending change in the delta.
    pub index: usize,
    pub change: Change,
    pub reason: ConflictReason,
}

/// Errors raised while starting or restoring a session.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error("hero '{hero}' cannot start in this world: {source}")]
    Conflict {
        hero: String,
        #[source]
        source: ConflictError,
    },
}

/// Holds a session's state and applies deltas to it atomically.
#[derive(Debug, Clone)]
pub struct SessionStore {
    world: Arc<World>,
    state: SessionState,
    rules: DiscoveryRules,
}

impl SessionStore {
    /// Start a new session for a hero. `None` picks the world's first hero.
    pub fn start(
        world: Arc<World>,
        hero: Option<&str>,
        rules: DiscoveryRules,
    ) -> Result<Self, StartError> {
        let hero = world.hero(hero)?.clone();
        let state = SessionState::new(SessionId::new(), hero.name.clone(), hero.start.clone());

        let opening = StateDelta::new()
            .with_all(world.arrival_changes(&hero.start))
            .with_all(hero.items.iter().flat_map(|item| {
                [
                    Change::DiscoverItem(item.clone()),
                    Change::AcquireItem(item.clone()),
                ]
            }));

        let mut store = Self {
            world,
            state,
            rules,
        };
        store
            .apply(&opening)
            .map_err(|source| StartError::Conflict {
                hero: hero.name.clone(),
                source,
            })?;

        debug!(session = %store.state.id, hero = %hero.name, "Session state initialised");
        Ok(store)
    }

    /// Resume from a previously saved state.
    pub fn restore(
        world: Arc<World>,
        state: SessionState,
        rules: DiscoveryRules,
    ) -> Result<Self, StartError> {
        if world.location(&state.location).is_none() {
            return Err(WorldError::DanglingReference {
                owner: format!("saved session {}", state.id),
                kind: EntityKind::Location,
                id: state.location.0.clone(),
            }
            .into());
        }
        Ok(Self {
            world,
            state,
            rules,
        })
    }

    /// Read the current state.
    pub fn get(&self) -> &SessionState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn rules(&self) -> DiscoveryRules {
        self.rules
    }

    /// Merge a delta into the state.
    ///
    /// Either every change applies or none does.
    pub fn apply(&mut self, delta: &StateDelta) -> Result<&SessionState, ConflictError> {
        let mut staged = self.state.clone();
        for (index, change) in delta.changes().iter().enumerate() {
            self.apply_change(&mut staged, change)
                .map_err(|reason| ConflictError {
                    index,
                    change: change.clone(),
                    reason,
                })?;
        }

        debug!(changes = delta.len(), "Delta applied");
        self.state = staged;
        Ok(&self.state)
    }

    /// Append a resolved choice to the chronicle and advance the turn.
    pub fn record_choice(&mut self, choice: impl Into<String>) {
        self.state.turn += 1;
        self.state.chronicle.push(ChronicleEntry {
            turn: self.state.turn,
            choice: choice.into(),
        });
    }

    fn apply_change(&self, state: &mut SessionState, change: &Change) -> Result<(), ConflictReason> {
        match change {
            Change::Travel(location) => {
                self.require_location(location)?;
                if self.rules.locations && !state.knows_location(location) {
                    return Err(undiscovered(EntityKind::Location, location.as_str()));
                }
                state.location = location.clone();
                state.visited.insert(location.clone());
                state.known_locations.insert(location.clone());
            }
            Change::RevealLocation(location) => {
                self.require_location(location)?;
                state.known_locations.insert(location.clone());
            }
            Change::DiscoverItem(item) => {
                self.require_item(item)?;
                state.discovered_items.insert(item.clone());
            }
            Change::AcquireItem(item) => {
                let def = self.require_item(item)?;
                if self.rules.items && !state.has_discovered(item) {
                    return Err(undiscovered(EntityKind::Item, item.as_str()));
                }
                if !def.portable {
                    return Err(ConflictReason::NotPortable(item.clone()));
                }
                state.discovered_items.insert(item.clone());
                state.claimed_items.insert(item.clone());
                state.inventory.insert(item.clone());
            }
            Change::ReleaseItem(item) => {
                self.require_item(item)?;
                if !state.inventory.remove(item) {
                    return Err(ConflictReason::NotCarried(item.clone()));
                }
            }
            Change::LearnLore(lore) => {
                state.lore.insert(lore.clone());
            }
            Change::MeetNpc(npc) => {
                let def = self.require_npc(npc)?;
                state
                    .npcs
                    .entry(npc.clone())
                    .or_insert_with(|| Disposition::new(def.disposition));
            }
            Change::AdjustDisposition { npc, amount } => {
                let def = self.require_npc(npc)?;
                if self.rules.npcs && !state.has_met(npc) {
                    return Err(undiscovered(EntityKind::Npc, npc.as_str()));
                }
                state
                    .npcs
                    .entry(npc.clone())
                    .or_insert_with(|| Disposition::new(def.disposition))
                    .adjust(*amount);
            }
        }
        Ok(())
    }

    fn require_location(&self, id: &LocationId) -> Result<(), ConflictReason> {
        self.world
            .location(id)
            .map(|_| ())
            .ok_or_else(|| unknown(EntityKind::Location, id.as_str()))
    }

    fn require_item(&self, id: &ItemId) -> Result<&crate::world::ItemDef, ConflictReason> {
        self.world
            .item(id)
            .ok_or_else(|| unknown(EntityKind::Item, id.as_str()))
    }

    fn require_npc(&self, id: &NpcId) -> Result<&crate::world::NpcDef, ConflictReason> {
        self.world
            .npc(id)
            .ok_or_else(|| unknown(EntityKind::Npc, id.as_str()))
    }
}

fn unknown(kind: EntityKind, id: &str) -> ConflictReason {
    ConflictReason::Unknown {
        kind,
        id: id.to_string(),
    }
}

fn undiscovered(kind: EntityKind, id: &str) -> ConflictReason {
    ConflictReason::Undiscovered {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest_store() -> SessionStore {
        let world = Arc::new(World::builtin().unwrap());
        SessionStore::start(world, Some("Wren the Wanderer"), DiscoveryRules::default()).unwrap()
    }

    #[test]
    fn test_start_applies_arrival_and_hero_items() {
        let store = forest_store();
        let state = store.get();

        assert_eq!(state.location(), &LocationId::new("forest"));
        assert!(state.knows_location(&LocationId::new("clearing")));
        assert!(state.knows_location(&LocationId::new("village")));
        assert!(state.has_discovered(&ItemId::new("glowing stone")));
        assert!(!state.has_discovered(&ItemId::new("silver acorn")));
        assert!(state.carries(&ItemId::new("travel cloak")));
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn test_start_with_unknown_hero() {
        let world = Arc::new(World::builtin().unwrap());
        let err = SessionStore::start(world, Some("Nobody"), DiscoveryRules::default()).unwrap_err();
        assert!(matches!(err, StartError::World(WorldError::UnknownHero(_))));
    }

    #[test]
    fn test_acquire_discovered_item() {
        let mut store = forest_store();
        let delta = StateDelta::new().with(Change::AcquireItem(ItemId::new("glowing stone")));

        let state = store.apply(&delta).unwrap();
        assert!(state.carries(&ItemId::new("glowing stone")));
        assert!(state.has_claimed(&ItemId::new("glowing stone")));
    }

    #[test]
    fn test_get_has_no_side_effects() {
        let store = forest_store();
        let before = store.get().clone();
        let _ = store.get();
        assert_eq!(store.get(), &before);
    }

    #[test]
    fn test_undiscovered_item_conflicts() {
        let mut store = forest_store();
        let before = store.get().clone();
        let delta = StateDelta::new()
            .with(Change::LearnLore("Something".into()))
            .with(Change::AcquireItem(ItemId::new("silver acorn")));

        let err = store.apply(&delta).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(
            err.reason,
            ConflictReason::Undiscovered { kind: EntityKind::Item, .. }
        ));
        // Nothing from the failed delta is committed.
        assert_eq!(store.get(), &before);
    }

    #[test]
    fn test_discovery_in_same_delta_satisfies_rule() {
        let mut store = forest_store();
        let delta = StateDelta::new()
            .with(Change::DiscoverItem(ItemId::new("silver acorn")))
            .with(Change::AcquireItem(ItemId::new("silver acorn")));

        assert!(store.apply(&delta).unwrap().carries(&ItemId::new("silver acorn")));
    }

    #[test]
    fn test_relaxed_rules_skip_discovery_check() {
        let world = Arc::new(World::builtin().unwrap());
        let rules = DiscoveryRules {
            items: false,
            ..DiscoveryRules::default()
        };
        let mut store = SessionStore::start(world, None, rules).unwrap();
        let delta = StateDelta::new().with(Change::AcquireItem(ItemId::new("silver acorn")));

        assert!(store.apply(&delta).unwrap().carries(&ItemId::new("silver acorn")));
    }

    #[test]
    fn test_unknown_entity_conflicts() {
        let mut store = forest_store();
        let delta = StateDelta::new().with(Change::DiscoverItem(ItemId::new("moon rock")));

        let err = store.apply(&delta).unwrap_err();
        assert!(matches!(err.reason, ConflictReason::Unknown { kind: EntityKind::Item, .. }));
    }

    #[test]
    fn test_travel_requires_known_location() {
        let mut store = forest_store();

        let err = store
            .apply(&StateDelta::new().with(Change::Travel(LocationId::new("tower"))))
            .unwrap_err();
        assert!(matches!(
            err.reason,
            ConflictReason::Undiscovered { kind: EntityKind::Location, .. }
        ));

        let state = store
            .apply(&StateDelta::new().with(Change::Travel(LocationId::new("clearing"))))
            .unwrap();
        assert_eq!(state.location(), &LocationId::new("clearing"));
        assert!(state.has_visited(&LocationId::new("clearing")));
    }

    #[test]
    fn test_non_portable_item_conflicts() {
        let mut store = forest_store();
        let delta = StateDelta::new()
            .with(Change::DiscoverItem(ItemId::new("anvil")))
            .with(Change::AcquireItem(ItemId::new("anvil")));

        let err = store.apply(&delta).unwrap_err();
        assert_eq!(err.reason, ConflictReason::NotPortable(ItemId::new("anvil")));
    }

    #[test]
    fn test_disposition_requires_meeting() {
        let mut store = forest_store();
        let hermit = NpcId::new("hermit");
        let adjust = StateDelta::new().with(Change::AdjustDisposition {
            npc: hermit.clone(),
            amount: 15,
        });

        assert!(store.apply(&adjust).is_err());

        store
            .apply(&StateDelta::new().with(Change::MeetNpc(hermit.clone())))
            .unwrap();
        store.apply(&adjust).unwrap();
        store
            .apply(&StateDelta::new().with(Change::AdjustDisposition {
                npc: hermit.clone(),
                amount: -40,
            }))
            .unwrap();

        assert_eq!(store.get().disposition(&hermit).unwrap().score(), -25);
    }

    #[test]
    fn test_meeting_twice_keeps_disposition() {
        let mut store = forest_store();
        let smith = NpcId::new("smith");
        let meet = StateDelta::new().with(Change::MeetNpc(smith.clone()));

        store.apply(&meet).unwrap();
        store
            .apply(&StateDelta::new().with(Change::AdjustDisposition {
                npc: smith.clone(),
                amount: 10,
            }))
            .unwrap();
        store.apply(&meet).unwrap();

        assert_eq!(store.get().disposition(&smith).unwrap().score(), -10);
    }

    #[test]
    fn test_set_valued_changes_are_idempotent() {
        let mut store = forest_store();
        let delta = StateDelta::new()
            .with(Change::DiscoverItem(ItemId::new("silver acorn")))
            .with(Change::AcquireItem(ItemId::new("glowing stone")))
            .with(Change::AcquireItem(ItemId::new("silver acorn")))
            .with(Change::RevealLocation(LocationId::new("ruins")))
            .with(Change::LearnLore("The oaks remember.".into()));

        let once = store.apply(&delta).unwrap().clone();
        let twice = store.apply(&delta).unwrap().clone();

        assert_eq!(once.inventory(), twice.inventory());
        assert_eq!(once.discovered_items(), twice.discovered_items());
        assert_eq!(once.known_locations(), twice.known_locations());
        assert_eq!(once.lore(), twice.lore());
    }

    #[test]
    fn test_release_keeps_item_discovered() {
        let mut store = forest_store();
        let cloak = ItemId::new("travel cloak");

        let state = store
            .apply(&StateDelta::new().with(Change::ReleaseItem(cloak.clone())))
            .unwrap();

        assert!(!state.carries(&cloak));
        assert!(state.has_discovered(&cloak));
    }

    #[test]
    fn test_release_of_item_not_carried_conflicts() {
        let mut store = forest_store();
        let lantern = ItemId::new("lantern");
        let before = store.get().clone();

        let err = store
            .apply(
                &StateDelta::new()
                    .with(Change::LearnLore("The oaks remember.".into()))
                    .with(Change::ReleaseItem(lantern.clone())),
            )
            .unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.reason, ConflictReason::NotCarried(lantern));
        assert_eq!(store.get(), &before);
    }

    #[test]
    fn test_record_choice_advances_turn() {
        let mut store = forest_store();
        store.record_choice("Look around");
        store.record_choice("Rest");

        let state = store.get();
        assert_eq!(state.turn(), 2);
        assert_eq!(state.chronicle().len(), 2);
        assert_eq!(state.chronicle()[1].choice, "Rest");
        assert_eq!(state.chronicle()[1].turn, 2);
    }

    #[test]
    fn test_restore_rejects_unknown_location() {
        let world = Arc::new(World::builtin().unwrap());
        let state = SessionState::new(SessionId::nil(), "Ghost", LocationId::new("void"));
        let err = SessionStore::restore(world, state, DiscoveryRules::default()).unwrap_err();
        assert!(matches!(err, StartError::World(WorldError::DanglingReference { .. })));
    }
}
