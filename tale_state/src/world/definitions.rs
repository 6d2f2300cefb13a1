//! Serde shapes of an authored world file.

use serde::{Deserialize, Serialize};

use crate::entities::{ItemId, LocationId, NpcId};

/// The raw contents of a world file, before indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFile {
    pub name: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default, rename = "location")]
    pub locations: Vec<LocationDef>,
    #[serde(default, rename = "item")]
    pub items: Vec<ItemDef>,
    #[serde(default, rename = "npc")]
    pub npcs: Vec<NpcDef>,
    #[serde(default, rename = "hero")]
    pub heroes: Vec<HeroDef>,
    #[serde(default, rename = "ending")]
    pub endings: Vec<EndingDef>,
}

/// A place the player can stand in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDef {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub exits: Vec<LocationId>,
    /// Items seen on arrival.
    #[serde(default)]
    pub items: Vec<ItemId>,
    /// Items found only by searching.
    #[serde(default)]
    pub hidden_items: Vec<ItemId>,
    #[serde(default)]
    pub npcs: Vec<NpcId>,
    /// Lore learned by looking around.
    #[serde(default)]
    pub lore: Vec<String>,
}

/// Something that can be found and possibly carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_portable")]
    pub portable: bool,
}

fn default_portable() -> bool {
    true
}

impl ItemDef {
    /// Display name, defaulting to the id.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// A non-player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcDef {
    pub id: NpcId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Spoken on first meeting.
    #[serde(default)]
    pub greeting: String,
    /// Starting disposition toward the player.
    #[serde(default)]
    pub disposition: i32,
    /// Items this character would gladly accept.
    #[serde(default)]
    pub desires: Vec<ItemId>,
    /// Lore shared once the character is friendly.
    #[serde(default)]
    pub secret: Option<String>,
}

impl NpcDef {
    pub fn desires(&self, item: &ItemId) -> bool {
        self.desires.contains(item)
    }
}

/// A playable starting character and setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start: LocationId,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

/// A condition that concludes the story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingDef {
    pub id: String,
    pub location: LocationId,
    #[serde(default)]
    pub requires_items: Vec<ItemId>,
    pub narration: String,
}
