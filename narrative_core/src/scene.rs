//! Scene descriptions - what the player currently perceives.

use serde::{Deserialize, Serialize};
use tale_state::{Attitude, SessionState, World};

/// An NPC visible in the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNpc {
    pub name: String,
    /// `None` until the player has met them.
    pub attitude: Option<Attitude>,
}

/// Everything about the current location worth telling the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub location_name: String,
    pub description: String,
    pub items_here: Vec<String>,
    pub npcs_here: Vec<SceneNpc>,
    /// Exit names, with unvisited ones flagged.
    pub exits: Vec<(String, bool)>,
}

impl Scene {
    /// Assemble the scene for the player's current location.
    pub fn describe(world: &World, state: &SessionState) -> Self {
        let location = world.location(state.location());

        Self {
            location_name: world.location_name(state.location()).to_string(),
            description: location.map(|l| l.description.clone()).unwrap_or_default(),
            items_here: world
                .items_available(state)
                .iter()
                .map(|item| world.item_name(item).to_string())
                .collect(),
            npcs_here: world
                .npcs_present(state)
                .iter()
                .map(|npc| SceneNpc {
                    name: world.npc_name(npc).to_string(),
                    attitude: state.disposition(npc).map(|d| d.attitude()),
                })
                .collect(),
            exits: location
                .map(|l| {
                    l.exits
                        .iter()
                        .map(|exit| {
                            (
                                world.location_name(exit).to_string(),
                                !state.has_visited(exit),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Format the scene as text for the player.
    pub fn render(&self) -> String {
        let mut text = String::new();

        text.push_str(&format!("== {} ==\n", capitalize(&self.location_name)));
        text.push_str(&self.description);
        text.push('\n');

        if !self.items_here.is_empty() {
            text.push_str(&format!("You notice: {}.\n", self.items_here.join(", ")));
        }

        if !self.npcs_here.is_empty() {
            let people: Vec<_> = self
                .npcs_here
                .iter()
                .map(|npc| match npc.attitude {
                    Some(attitude) => format!("{} ({})", npc.name, attitude),
                    None => npc.name.clone(),
                })
                .collect();
            text.push_str(&format!("Here: {}.\n", people.join(", ")));
        }

        if !self.exits.is_empty() {
            let exits: Vec<_> = self
                .exits
                .iter()
                .map(|(name, new)| {
                    if *new {
                        format!("{} (unexplored)", name)
                    } else {
                        name.clone()
                    }
                })
                .collect();
            text.push_str(&format!("Paths lead to: {}.\n", exits.join(", ")));
        }

        text
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
