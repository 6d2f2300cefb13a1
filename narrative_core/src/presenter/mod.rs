//! Choice Presenter - suggests what the player might do next.
//!
//! Presentation works in three steps:
//! 1. **Gather**: every action available from the current state becomes a candidate
//! 2. **Score**: candidates that lead somewhere new score higher
//! 3. **Select**: the best 3-4 are kept and the wildcard is attached
//!
//! Presentation is a pure function of the world and the session state.

mod ranking;

pub use ranking::*;

use serde::{Deserialize, Serialize};
use tale_state::{SessionState, World};

use crate::choice::{Action, Choice, ChoiceMenu, Wildcard};

/// Fewest explicit choices a menu ever shows.
pub const MIN_CHOICES: usize = 3;
/// Most explicit choices a menu ever shows.
pub const MAX_CHOICES: usize = 4;

/// Configuration for the choice presenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Number of explicit choices to offer, clamped to 3..=4.
    pub max_choices: usize,

    /// Text of the free-form affordance.
    pub wildcard_prompt: String,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            max_choices: MAX_CHOICES,
            wildcard_prompt: Wildcard::default().prompt().to_string(),
        }
    }
}

/// The presenter builds choice menus from state.
#[derive(Debug, Clone)]
pub struct ChoicePresenter {
    config: PresenterConfig,
}

impl ChoicePresenter {
    /// Create a presenter with the given configuration.
    pub fn new(config: PresenterConfig) -> Self {
        Self { config }
    }

    /// Create a presenter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PresenterConfig::default())
    }

    /// Effective menu size.
    pub fn max_choices(&self) -> usize {
        self.config.max_choices.clamp(MIN_CHOICES, MAX_CHOICES)
    }

    /// Build the menu for the current state.
    pub fn present(&self, world: &World, state: &SessionState) -> ChoiceMenu {
        let pool = self.gather(world, state);

        let choices = pool
            .ranked(|action| action.label(world))
            .into_iter()
            .take(self.max_choices())
            .map(|(action, _)| Choice::for_action(world, action.clone()))
            .collect();

        ChoiceMenu::new(choices, Wildcard::new(self.config.wildcard_prompt.clone()))
    }

    /// Score every available action.
    pub fn gather(&self, world: &World, state: &SessionState) -> CandidatePool {
        let mut pool = CandidatePool::new();

        for item in world.items_portable(state) {
            pool.offer(Action::Take(item), 0.9);
        }

        for npc_id in world.npcs_present(state) {
            let Some(npc) = world.npc(&npc_id) else {
                continue;
            };

            let talk_score = match state.disposition(&npc_id) {
                None => 0.85,
                Some(_) if npc.secret.as_deref().is_some_and(|s| !state.knows_lore(s)) => 0.5,
                Some(_) => 0.2,
            };
            pool.offer(Action::Talk(npc_id.clone()), talk_score);

            for item in state.inventory().iter().filter(|item| npc.desires(item)) {
                pool.offer(
                    Action::Give {
                        item: item.clone(),
                        npc: npc_id.clone(),
                    },
                    0.95,
                );
            }
        }

        if let Some(location) = world.location(state.location()) {
            for exit in &location.exits {
                let score = if state.has_visited(exit) { 0.3 } else { 0.8 };
                pool.offer(Action::Travel(exit.clone()), score);
            }

            let unexplored = location.lore.iter().any(|l| !state.knows_lore(l))
                || location
                    .hidden_items
                    .iter()
                    .any(|item| !state.has_discovered(item));
            pool.offer(Action::Examine, if unexplored { 0.7 } else { 0.1 });
        } else {
            pool.offer(Action::Examine, 0.1);
        }

        // Always available, so a menu never drops below three choices.
        pool.offer(Action::Rest, 0.05);
        pool.offer(Action::Inventory, 0.04);

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tale_state::{
        Change, DiscoveryRules, ItemId, LocationId, NpcId, SessionStore, StateDelta,
    };

    fn store(hero: &str) -> SessionStore {
        let world = Arc::new(World::builtin().unwrap());
        SessionStore::start(world, Some(hero), DiscoveryRules::default()).unwrap()
    }

    #[test]
    fn test_menu_size_bounds() {
        let store = store("Wren the Wanderer");

        for max in [0, 1, 3, 4, 9] {
            let presenter = ChoicePresenter::new(PresenterConfig {
                max_choices: max,
                ..PresenterConfig::default()
            });
            let menu = presenter.present(store.world(), store.get());
            assert!(
                (MIN_CHOICES..=MAX_CHOICES).contains(&menu.len()),
                "max_choices={} gave {} choices",
                max,
                menu.len()
            );
            assert!(!menu.wildcard().prompt().is_empty());
        }
    }

    #[test]
    fn test_new_things_rank_first() {
        let store = store("Wren the Wanderer");
        let menu = ChoicePresenter::with_defaults().present(store.world(), store.get());

        assert_eq!(
            menu.get(1).unwrap().action(),
            &Action::Take(ItemId::new("glowing stone"))
        );
        assert!(menu
            .choices()
            .iter()
            .any(|c| c.action() == &Action::Travel(LocationId::new("clearing"))));
    }

    #[test]
    fn test_presenting_is_pure() {
        let store = store("Wren the Wanderer");
        let presenter = ChoicePresenter::with_defaults();
        let before = store.get().clone();

        let first = presenter.present(store.world(), store.get());
        let second = presenter.present(store.world(), store.get());

        assert_eq!(first, second);
        assert_eq!(store.get(), &before);
    }

    #[test]
    fn test_give_offered_for_desired_item() {
        let mut store = store("Wren the Wanderer");
        let delta = StateDelta::new()
            .with(Change::RevealLocation(LocationId::new("clearing")))
            .with(Change::Travel(LocationId::new("clearing")))
            .with(Change::DiscoverItem(ItemId::new("wild sage")))
            .with(Change::AcquireItem(ItemId::new("wild sage")));
        store.apply(&delta).unwrap();

        let menu = ChoicePresenter::with_defaults().present(store.world(), store.get());
        assert_eq!(
            menu.get(1).unwrap().action(),
            &Action::Give {
                item: ItemId::new("wild sage"),
                npc: NpcId::new("hermit"),
            }
        );
        // Already claimed, so no longer offered for pickup.
        assert!(!menu
            .choices()
            .iter()
            .any(|c| c.action() == &Action::Take(ItemId::new("wild sage"))));
    }

    #[test]
    fn test_fallbacks_fill_a_quiet_place() {
        let mut store = store("Wren the Wanderer");
        let explored = StateDelta::new()
            .with(Change::AcquireItem(ItemId::new("glowing stone")))
            .with(Change::LearnLore(
                "The oaks are said to remember every traveller who passes beneath them.".into(),
            ))
            .with(Change::DiscoverItem(ItemId::new("silver acorn")))
            .with(Change::AcquireItem(ItemId::new("silver acorn")));
        store.apply(&explored).unwrap();

        let pool = ChoicePresenter::with_defaults().gather(store.world(), store.get());
        assert!(pool.score(&Action::Examine) < 0.2);
        assert!(pool.score(&Action::Rest) > 0.0);
        assert!(pool.score(&Action::Inventory) > 0.0);

        let menu = ChoicePresenter::with_defaults().present(store.world(), store.get());
        assert_eq!(menu.len(), MAX_CHOICES);
    }

    #[test]
    fn test_fixed_items_are_never_offered() {
        let store = store("Kael the Sellsword");
        let pool = ChoicePresenter::with_defaults().gather(store.world(), store.get());
        assert_eq!(pool.score(&Action::Take(ItemId::new("anvil"))), 0.0);

        let menu = ChoicePresenter::with_defaults().present(store.world(), store.get());
        assert!(!menu
            .choices()
            .iter()
            .any(|c| c.action() == &Action::Take(ItemId::new("anvil"))));
        assert!(menu
            .choices()
            .iter()
            .any(|c| c.action() == &Action::Take(ItemId::new("lantern"))));
    }
}
