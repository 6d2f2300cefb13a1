//! Choices offered to the player and the input they send back.

use serde::{Deserialize, Serialize};
use tale_state::{ItemId, LocationId, NpcId, World};

/// What a choice does when resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Take(ItemId),
    Travel(LocationId),
    Talk(NpcId),
    Give { item: ItemId, npc: NpcId },
    Examine,
    Rest,
    Inventory,
}

impl Action {
    /// Player-facing label, using the world's display names.
    pub fn label(&self, world: &World) -> String {
        match self {
            Action::Take(item) => format!("Pick up the {}", world.item_name(item)),
            Action::Travel(location) => format!("Travel to {}", world.location_name(location)),
            Action::Talk(npc) => format!("Talk to {}", world.npc_name(npc)),
            Action::Give { item, npc } => format!(
                "Give the {} to {}",
                world.item_name(item),
                world.npc_name(npc)
            ),
            Action::Examine => "Look around".to_string(),
            Action::Rest => "Rest for a while".to_string(),
            Action::Inventory => "Check your pack".to_string(),
        }
    }
}

/// A presented option. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    label: String,
    action: Action,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    /// Build a choice labelled from the world.
    pub fn for_action(world: &World, action: Action) -> Self {
        Self::new(action.label(world), action)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// The open-ended "do something else" affordance that accompanies every menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wildcard {
    prompt: String,
}

impl Wildcard {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

impl Default for Wildcard {
    fn default() -> Self {
        Self::new("Or describe anything else you want to do.")
    }
}

/// Ordered suggestions plus the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMenu {
    choices: Vec<Choice>,
    wildcard: Wildcard,
}

impl ChoiceMenu {
    pub fn new(choices: Vec<Choice>, wildcard: Wildcard) -> Self {
        Self { choices, wildcard }
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn wildcard(&self) -> &Wildcard {
        &self.wildcard
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Look up a choice by its 1-based menu number.
    pub fn get(&self, number: usize) -> Option<&Choice> {
        number.checked_sub(1).and_then(|i| self.choices.get(i))
    }
}

impl std::fmt::Display for ChoiceMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, choice) in self.choices.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, choice.label)?;
        }
        write!(f, "  {}", self.wildcard.prompt)
    }
}

/// A line of player input, classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// A numbered menu choice (1-based).
    Choose(usize),
    /// Anything the player typed instead of a number.
    FreeForm(String),
    /// End the session.
    Quit,
}

impl PlayerInput {
    /// Classify a raw line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Ok(number) = line.parse::<usize>() {
            return Some(PlayerInput::Choose(number));
        }

        match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "end" => Some(PlayerInput::Quit),
            _ => Some(PlayerInput::FreeForm(line.to_string())),
        }
    }
}
