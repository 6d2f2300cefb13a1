//! Narrative Resolver - turns a chosen action into narration and a state delta.
//!
//! The resolver never mutates state. It reads the world and the session,
//! then describes what should happen as an [`Outcome`]; the session applies
//! the delta through the store.

mod parser;

pub use parser::*;

use serde::{Deserialize, Serialize};
use tale_state::{Attitude, Change, ItemId, LocationId, NpcId, SessionState, StateDelta, World};

use crate::choice::Action;

/// Disposition gained on first meeting.
const MEETING_WARMTH: i32 = 5;
/// Disposition gained when handing over a desired item.
const GIFT_WARMTH: i32 = 40;

const TRAVEL_LINES: &[&str] = &[
    "You make your way to",
    "You set off toward",
    "Your path carries you to",
];

const REST_LINES: &[&str] = &[
    "You rest against a mossy stone and let your breathing slow.",
    "You sit a while, listening to the world around you.",
    "You close your eyes for a moment. When you open them nothing has changed, but you feel steadier.",
];

/// The result of resolving one choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub narration: String,
    pub delta: StateDelta,
}

impl Outcome {
    pub fn new(narration: impl Into<String>, delta: StateDelta) -> Self {
        Self {
            narration: narration.into(),
            delta,
        }
    }

    /// Narration that leaves the state untouched.
    pub fn narration_only(narration: impl Into<String>) -> Self {
        Self::new(narration, StateDelta::new())
    }
}

/// Resolves actions against a world.
#[derive(Debug, Clone, Default)]
pub struct NarrativeResolver;

impl NarrativeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Parse free-form text into an action.
    pub fn interpret(
        &self,
        world: &World,
        state: &SessionState,
        input: &str,
    ) -> Result<Action, UnrecognizedActionError> {
        interpret(world, state, input)
    }

    /// Describe what an action does from the current state.
    pub fn resolve(&self, world: &World, state: &SessionState, action: &Action) -> Outcome {
        match action {
            Action::Take(item) => self.take(world, state, item),
            Action::Travel(location) => self.travel(world, state, location),
            Action::Talk(npc) => self.talk(world, state, npc),
            Action::Give { item, npc } => self.give(world, state, item, npc),
            Action::Examine => self.examine(world, state),
            Action::Rest => Outcome::narration_only(pick(REST_LINES, state.turn())),
            Action::Inventory => self.inventory(world, state),
        }
    }

    /// Parse and resolve free-form text in one step.
    pub fn resolve_free_form(
        &self,
        world: &World,
        state: &SessionState,
        input: &str,
    ) -> Result<(Action, Outcome), UnrecognizedActionError> {
        let action = self.interpret(world, state, input)?;
        let outcome = self.resolve(world, state, &action);
        Ok((action, outcome))
    }

    /// Narrate input that could not be understood.
    pub fn narrate_confusion(&self, error: &UnrecognizedActionError) -> String {
        match &error.reason {
            UnrecognizedReason::UnknownVerb => format!(
                "You consider how you might {}, but nothing here makes that possible.",
                error.input.trim_end_matches(&['.', '!', '?'][..])
            ),
            UnrecognizedReason::MissingTarget { verb } => {
                format!("You mean to {}, but you are not sure what.", verb)
            }
            UnrecognizedReason::UnavailableTarget { verb, target } => format!(
                "You look for any {} you could {}, but there is none here.",
                target, verb
            ),
            UnrecognizedReason::NoSuchChoice(number) => format!(
                "There is no path numbered {}. Choose from the options, or describe what you do.",
                number
            ),
        }
    }

    fn take(&self, world: &World, state: &SessionState, item: &ItemId) -> Outcome {
        let name = world.item_name(item);

        if state.carries(item) {
            return Outcome::narration_only(format!("You already carry the {}.", name));
        }
        if !world.items_available(state).contains(item) {
            return Outcome::narration_only(format!("There is no {} here to take.", name));
        }

        let Some(def) = world.item(item) else {
            return Outcome::narration_only(format!("There is no {} here to take.", name));
        };
        if !def.portable {
            return Outcome::narration_only(format!(
                "You strain against the {}, but it will not budge.",
                name
            ));
        }

        let narration = if def.description.is_empty() {
            format!("You pick up the {}.", name)
        } else {
            format!("You pick up the {}. {}", name, def.description)
        };
        Outcome::new(
            narration,
            StateDelta::new()
                .with(Change::DiscoverItem(item.clone()))
                .with(Change::AcquireItem(item.clone())),
        )
    }

    fn travel(&self, world: &World, state: &SessionState, location: &LocationId) -> Outcome {
        let Some(def) = world.location(location) else {
            return Outcome::narration_only("You cannot find a way there.");
        };
        if state.location() == location {
            return Outcome::narration_only(format!("You are already in {}.", def.name));
        }

        let narration = format!(
            "{} {}.\n\n{}",
            pick(TRAVEL_LINES, state.turn()),
            def.name,
            def.description
        );
        Outcome::new(
            narration,
            StateDelta::new()
                .with(Change::Travel(location.clone()))
                .with_all(world.arrival_changes(location)),
        )
    }

    fn talk(&self, world: &World, state: &SessionState, npc: &NpcId) -> Outcome {
        let Some(def) = world.npc(npc) else {
            return Outcome::narration_only("There is no one by that name here.");
        };

        let Some(disposition) = state.disposition(npc) else {
            let mut narration = def.description.clone();
            if !def.greeting.is_empty() {
                if !narration.is_empty() {
                    narration.push('\n');
                }
                narration.push_str(&format!("{} says: \"{}\"", def.name, def.greeting));
            }
            return Outcome::new(
                narration,
                StateDelta::new()
                    .with(Change::MeetNpc(npc.clone()))
                    .with(Change::AdjustDisposition {
                        npc: npc.clone(),
                        amount: MEETING_WARMTH,
                    }),
            );
        };

        let attitude = disposition.attitude();
        if let Some(secret) = def.secret.as_deref() {
            if attitude.is_warm() && !state.knows_lore(secret) {
                return Outcome::new(
                    format!("{} lowers their voice: \"{}\"", def.name, secret),
                    StateDelta::new()
                        .with(Change::LearnLore(secret.to_string()))
                        .with(Change::AdjustDisposition {
                            npc: npc.clone(),
                            amount: 2,
                        }),
                );
            }
        }

        let (line, warmth) = match attitude {
            Attitude::Hostile => (
                format!("{} turns away and refuses to speak with you.", def.name),
                0,
            ),
            Attitude::Wary => (
                format!("{} answers in clipped words, still measuring you.", def.name),
                2,
            ),
            Attitude::Neutral => (
                format!("{} trades a few pleasantries with you.", def.name),
                3,
            ),
            Attitude::Friendly | Attitude::Devoted => (
                format!("{} greets you warmly, glad of the company.", def.name),
                1,
            ),
        };

        let mut delta = StateDelta::new();
        if warmth != 0 {
            delta.push(Change::AdjustDisposition {
                npc: npc.clone(),
                amount: warmth,
            });
        }
        Outcome::new(line, delta)
    }

    fn give(&self, world: &World, state: &SessionState, item: &ItemId, npc: &NpcId) -> Outcome {
        let item_name = world.item_name(item);
        let npc_name = world.npc_name(npc);

        if !state.carries(item) {
            return Outcome::narration_only(format!("You are not carrying the {}.", item_name));
        }
        if !world.npcs_present(state).contains(npc) {
            return Outcome::narration_only(format!("{} is not here.", npc_name));
        }
        let Some(def) = world.npc(npc) else {
            return Outcome::narration_only(format!("{} is not here.", npc_name));
        };

        let mut delta = StateDelta::new();
        if !state.has_met(npc) {
            delta.push(Change::MeetNpc(npc.clone()));
        }

        if !def.desires(item) {
            return Outcome::new(
                format!(
                    "{} turns the {} over in their hands, then politely hands it back.",
                    npc_name, item_name
                ),
                delta,
            );
        }

        delta.push(Change::ReleaseItem(item.clone()));
        delta.push(Change::AdjustDisposition {
            npc: npc.clone(),
            amount: GIFT_WARMTH,
        });
        Outcome::new(
            format!(
                "{} accepts the {} with obvious delight. Something in their manner toward you softens.",
                npc_name, item_name
            ),
            delta,
        )
    }

    fn examine(&self, world: &World, state: &SessionState) -> Outcome {
        let Some(location) = world.location(state.location()) else {
            return Outcome::narration_only("There is nothing to see.");
        };

        let mut delta = StateDelta::new();
        let mut lines = vec![location.description.clone()];

        for lore in location.lore.iter().filter(|l| !state.knows_lore(l)) {
            lines.push(lore.clone());
            delta.push(Change::LearnLore(lore.clone()));
        }

        for item in location
            .hidden_items
            .iter()
            .filter(|item| !state.has_discovered(item))
        {
            lines.push(format!(
                "Searching carefully, you notice a {} tucked out of sight.",
                world.item_name(item)
            ));
            delta.push(Change::DiscoverItem(item.clone()));
        }

        if delta.is_empty() {
            lines.push("You search carefully but find nothing new.".to_string());
        }

        Outcome::new(lines.join("\n"), delta)
    }

    fn inventory(&self, world: &World, state: &SessionState) -> Outcome {
        if state.inventory().is_empty() {
            return Outcome::narration_only("Your pack is empty.");
        }

        let names: Vec<_> = state
            .inventory()
            .iter()
            .map(|item| world.item_name(item))
            .collect();
        Outcome::narration_only(format!("You are carrying: {}.", names.join(", ")))
    }
}

fn pick(lines: &[&'static str], turn: u32) -> &'static str {
    lines[turn as usize % lines.len()]
}
