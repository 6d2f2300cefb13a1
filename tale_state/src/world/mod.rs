//! Authored worlds - the static scenario a session plays through.
//!
//! A world is read from TOML and checked for dangling references once at
//! load time. After that it is immutable and shared by the session.

mod definitions;

pub use definitions::*;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::delta::Change;
use crate::entities::{EntityKind, ItemId, LocationId, NpcId};
use crate::state::SessionState;

const BUILTIN_WORLD: &str = include_str!("../../worlds/whispering_wood.toml");

/// Errors raised while loading or validating a world.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read world file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse world: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("world defines {kind} '{id}' more than once")]
    Duplicate { kind: EntityKind, id: String },

    #[error("{owner} refers to unknown {kind} '{id}'")]
    DanglingReference {
        owner: String,
        kind: EntityKind,
        id: String,
    },

    #[error("world defines no heroes")]
    NoHeroes,

    #[error("no hero named '{0}'")]
    UnknownHero(String),
}

/// A validated, indexed world.
#[derive(Debug, Clone)]
pub struct World {
    name: String,
    intro: String,
    locations: BTreeMap<LocationId, LocationDef>,
    items: BTreeMap<ItemId, ItemDef>,
    npcs: BTreeMap<NpcId, NpcDef>,
    heroes: Vec<HeroDef>,
    endings: Vec<EndingDef>,
}

impl World {
    /// The world bundled with the crate.
    pub fn builtin() -> Result<Self, WorldError> {
        Self::from_toml_str(BUILTIN_WORLD)
    }

    /// Load a world from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a world from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, WorldError> {
        let file: WorldFile = toml::from_str(text)?;
        Self::from_file(file)
    }

    /// Index and validate a parsed world file.
    pub fn from_file(file: WorldFile) -> Result<Self, WorldError> {
        let mut locations = BTreeMap::new();
        for location in file.locations {
            let id = location.id.clone();
            if locations.insert(id.clone(), location).is_some() {
                return Err(WorldError::Duplicate {
                    kind: EntityKind::Location,
                    id: id.0,
                });
            }
        }

        let mut items = BTreeMap::new();
        for item in file.items {
            let id = item.id.clone();
            if items.insert(id.clone(), item).is_some() {
                return Err(WorldError::Duplicate {
                    kind: EntityKind::Item,
                    id: id.0,
                });
            }
        }

        let mut npcs = BTreeMap::new();
        for npc in file.npcs {
            let id = npc.id.clone();
            if npcs.insert(id.clone(), npc).is_some() {
                return Err(WorldError::Duplicate {
                    kind: EntityKind::Npc,
                    id: id.0,
                });
            }
        }

        if file.heroes.is_empty() {
            return Err(WorldError::NoHeroes);
        }

        let world = Self {
            name: file.name,
            intro: file.intro,
            locations,
            items,
            npcs,
            heroes: file.heroes,
            endings: file.endings,
        };
        world.check_references()?;
        Ok(world)
    }

    fn check_references(&self) -> Result<(), WorldError> {
        for location in self.locations.values() {
            let owner = format!("location '{}'", location.id);
            for exit in &location.exits {
                self.require_location(&owner, exit)?;
            }
            for item in location.items.iter().chain(&location.hidden_items) {
                self.require_item(&owner, item)?;
            }
            for npc in &location.npcs {
                self.require_npc(&owner, npc)?;
            }
        }

        for npc in self.npcs.values() {
            let owner = format!("character '{}'", npc.id);
            for item in &npc.desires {
                self.require_item(&owner, item)?;
            }
        }

        for hero in &self.heroes {
            let owner = format!("hero '{}'", hero.name);
            self.require_location(&owner, &hero.start)?;
            for item in &hero.items {
                self.require_item(&owner, item)?;
            }
        }

        for ending in &self.endings {
            let owner = format!("ending '{}'", ending.id);
            self.require_location(&owner, &ending.location)?;
            for item in &ending.requires_items {
                self.require_item(&owner, item)?;
            }
        }

        Ok(())
    }

    fn require_location(&self, owner: &str, id: &LocationId) -> Result<(), WorldError> {
        if self.locations.contains_key(id) {
            Ok(())
        } else {
            Err(dangling(owner, EntityKind::Location, id.as_str()))
        }
    }

    fn require_item(&self, owner: &str, id: &ItemId) -> Result<(), WorldError> {
        if self.items.contains_key(id) {
            Ok(())
        } else {
            Err(dangling(owner, EntityKind::Item, id.as_str()))
        }
    }

    fn require_npc(&self, owner: &str, id: &NpcId) -> Result<(), WorldError> {
        if self.npcs.contains_key(id) {
            Ok(())
        } else {
            Err(dangling(owner, EntityKind::Npc, id.as_str()))
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intro(&self) -> &str {
        &self.intro
    }

    pub fn location(&self, id: &LocationId) -> Option<&LocationDef> {
        self.locations.get(id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn npc(&self, id: &NpcId) -> Option<&NpcDef> {
        self.npcs.get(id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &LocationDef> {
        self.locations.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.values()
    }

    pub fn npcs(&self) -> impl Iterator<Item = &NpcDef> {
        self.npcs.values()
    }

    pub fn heroes(&self) -> &[HeroDef] {
        &self.heroes
    }

    pub fn endings(&self) -> &[EndingDef] {
        &self.endings
    }

    /// Find a hero by name (case-insensitive). `None` picks the first hero.
    pub fn hero(&self, name: Option<&str>) -> Result<&HeroDef, WorldError> {
        match name {
            None => self.heroes.first().ok_or(WorldError::NoHeroes),
            Some(name) => self
                .heroes
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| WorldError::UnknownHero(name.to_string())),
        }
    }

    /// Display name for a location, falling back to its id.
    pub fn location_name<'a>(&'a self, id: &'a LocationId) -> &'a str {
        self.location(id).map(|l| l.name.as_str()).unwrap_or(id.as_str())
    }

    /// Display name for an item, falling back to its id.
    pub fn item_name<'a>(&'a self, id: &'a ItemId) -> &'a str {
        self.item(id).map(|i| i.name()).unwrap_or(id.as_str())
    }

    /// Display name for an NPC, falling back to its id.
    pub fn npc_name<'a>(&'a self, id: &'a NpcId) -> &'a str {
        self.npc(id).map(|n| n.name.as_str()).unwrap_or(id.as_str())
    }

    /// Changes that follow from arriving at a location: its exits become
    /// known and its visible items are seen.
    pub fn arrival_changes(&self, id: &LocationId) -> Vec<Change> {
        let Some(location) = self.location(id) else {
            return Vec::new();
        };

        let exits = location
            .exits
            .iter()
            .cloned()
            .map(Change::RevealLocation);
        let items = location.items.iter().cloned().map(Change::DiscoverItem);
        exits.chain(items).collect()
    }

    /// Items at the player's location that have been seen but never picked up.
    pub fn items_available(&self, state: &SessionState) -> Vec<ItemId> {
        let Some(location) = self.location(state.location()) else {
            return Vec::new();
        };

        location
            .items
            .iter()
            .chain(&location.hidden_items)
            .filter(|item| state.has_discovered(item) && !state.has_claimed(item))
            .cloned()
            .collect()
    }

    /// Available items that can actually be carried off.
    pub fn items_portable(&self, state: &SessionState) -> Vec<ItemId> {
        self.items_available(state)
            .into_iter()
            .filter(|id| self.item(id).is_some_and(|item| item.portable))
            .collect()
    }

    /// NPCs present at the player's location.
    pub fn npcs_present(&self, state: &SessionState) -> Vec<NpcId> {
        self.location(state.location())
            .map(|l| l.npcs.clone())
            .unwrap_or_default()
    }

    /// The first ending whose requirements the state satisfies.
    pub fn reached_ending(&self, state: &SessionState) -> Option<&EndingDef> {
        self.endings.iter().find(|ending| {
            &ending.location == state.location()
                && ending.requires_items.iter().all(|item| state.carries(item))
        })
    }
}

fn dangling(owner: &str, kind: EntityKind, id: &str) -> WorldError {
    WorldError::DanglingReference {
        owner: owner.to_string(),
        kind,
        id: id.to_string(),
    }
}
