//! Session Loop - drives presenter, player input, resolver and state updates.
//!
//! A session is a small state machine: it stays `Active` while play
//! continues and becomes `Terminated` when the player quits, a world ending
//! is reached, or [`Session::end`] is called. Both recoverable errors are
//! handled inside a turn:
//!
//! - **Unrecognized input** is narrated as confusion. The state is untouched
//!   and the same menu is offered again.
//! - **Conflicting deltas** lose the offending change and are applied again
//!   until what remains is valid.

mod driver;
mod transcript;

pub use driver::*;
pub use transcript::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tale_state::{SessionId, SessionState, SessionStore, StartError, StateDelta, World};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::choice::{Action, ChoiceMenu, PlayerInput};
use crate::config::HearthtaleConfig;
use crate::presenter::ChoicePresenter;
use crate::resolver::{NarrativeResolver, UnrecognizedActionError, UnrecognizedReason};
use crate::scene::Scene;

const QUIT_NARRATION: &str =
    "You pause your tale here. The road will wait for you, and so will everything you have found.";

/// Errors from driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the session has already ended")]
    Terminated,

    #[error(transparent)]
    Start(#[from] StartError),

    #[error("failed to access {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to encode or decode session snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    PlayerQuit,
    /// A world ending was reached.
    Ending { id: String },
    /// Ended by the host.
    Ended,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Terminated(Termination),
}

/// What kind of turn just happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnKind {
    /// A choice was resolved and its delta applied.
    Resolved {
        action: Action,
        /// Changes dropped to resolve conflicts.
        dropped_changes: usize,
    },
    /// The input was not understood. Nothing changed.
    Confused(UnrecognizedActionError),
    /// The player quit.
    Quit,
}

/// The result of one turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub narration: String,
    pub kind: TurnKind,
    pub status: SessionStatus,
    /// The next menu, if the session is still active.
    pub menu: Option<ChoiceMenu>,
    pub turn: u32,
}

/// A serialisable copy of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub status: SessionStatus,
    pub transcript: Transcript,
}

/// One player's playthrough of a world.
#[derive(Debug, Clone)]
pub struct Session {
    store: SessionStore,
    presenter: ChoicePresenter,
    resolver: NarrativeResolver,
    transcript: Transcript,
    status: SessionStatus,
    menu: ChoiceMenu,
}

impl Session {
    /// Start a new session. `hero` of `None` picks the world's first hero.
    pub fn begin(
        world: Arc<World>,
        hero: Option<&str>,
        config: &HearthtaleConfig,
    ) -> Result<Self, SessionError> {
        let store = SessionStore::start(world, hero, config.discovery)?;
        let mut opening = compose_opening(store.world(), store.get());

        info!(
            session = %store.get().id(),
            hero = %store.get().hero(),
            world = %store.world().name(),
            "Session started"
        );

        let mut status = SessionStatus::Active;
        if let Some(ending) = store.world().reached_ending(store.get()) {
            opening.push_str("\n\n");
            opening.push_str(&ending.narration);
            info!(ending = %ending.id, "Session began at an ending");
            status = SessionStatus::Terminated(Termination::Ending {
                id: ending.id.clone(),
            });
        }

        let transcript = Transcript::new(opening, config.session.max_history);
        Ok(Self::assemble(store, transcript, status, config))
    }

    /// Resume a session from a snapshot.
    pub fn restore(
        world: Arc<World>,
        snapshot: SessionSnapshot,
        config: &HearthtaleConfig,
    ) -> Result<Self, SessionError> {
        let store = SessionStore::restore(world, snapshot.state, config.discovery)?;
        info!(session = %store.get().id(), turn = store.get().turn(), "Session restored");
        let mut transcript = snapshot.transcript;
        transcript.set_max_history(config.session.max_history);
        Ok(Self::assemble(store, transcript, snapshot.status, config))
    }

    fn assemble(
        store: SessionStore,
        transcript: Transcript,
        status: SessionStatus,
        config: &HearthtaleConfig,
    ) -> Self {
        let presenter = ChoicePresenter::new(config.presenter.clone());
        let menu = presenter.present(store.world(), store.get());
        Self {
            store,
            presenter,
            resolver: NarrativeResolver::new(),
            transcript,
            status,
            menu,
        }
    }

    pub fn id(&self) -> SessionId {
        self.store.get().id()
    }

    pub fn world(&self) -> &World {
        self.store.world()
    }

    pub fn state(&self) -> &SessionState {
        self.store.get()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn opening(&self) -> &str {
        self.transcript.opening()
    }

    /// The menu currently on offer.
    pub fn present(&self) -> &ChoiceMenu {
        &self.menu
    }

    /// What the player sees where they stand.
    pub fn scene(&self) -> Scene {
        Scene::describe(self.world(), self.state())
    }

    /// End the session from outside the turn loop.
    pub fn end(&mut self) {
        if self.is_active() {
            info!(session = %self.id(), "Session ended by host");
            self.status = SessionStatus::Terminated(Termination::Ended);
        }
    }

    /// Play one turn.
    #[instrument(skip_all, fields(session = %self.id(), turn = self.state().turn()))]
    pub fn take_turn(&mut self, input: PlayerInput) -> Result<TurnReport, SessionError> {
        if !self.is_active() {
            return Err(SessionError::Terminated);
        }

        match input {
            PlayerInput::Quit => {
                self.transcript.push(Speaker::Player, "quit");
                self.transcript.push(Speaker::Narrator, QUIT_NARRATION);
                self.status = SessionStatus::Terminated(Termination::PlayerQuit);
                info!(turns = self.state().turn(), "Player ended the session");
                Ok(self.report(QUIT_NARRATION.to_string(), TurnKind::Quit))
            }
            PlayerInput::Choose(number) => {
                self.transcript.push(Speaker::Player, number.to_string());
                match self.menu.get(number).cloned() {
                    Some(choice) => Ok(self.play_action(choice.label(), choice.action().clone())),
                    None => Ok(self.confused(UnrecognizedActionError::new(
                        number.to_string(),
                        UnrecognizedReason::NoSuchChoice(number),
                    ))),
                }
            }
            PlayerInput::FreeForm(text) => {
                self.transcript.push(Speaker::Player, text.as_str());
                match self.resolver.interpret(self.world(), self.state(), &text) {
                    Ok(action) => Ok(self.play_action(&text, action)),
                    Err(error) => Ok(self.confused(error)),
                }
            }
        }
    }

    /// Save a snapshot as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json).map_err(|source| SessionError::File {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state().clone(),
            status: self.status.clone(),
            transcript: self.transcript.clone(),
        }
    }

    /// Read a snapshot written by [`Session::save`].
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<SessionSnapshot, SessionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::File {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn play_action(&mut self, label: &str, action: Action) -> TurnReport {
        let outcome = self.resolver.resolve(self.world(), self.state(), &action);
        let previous_location = self.state().location().clone();

        let dropped_changes = self.apply_with_recovery(outcome.delta);
        self.store.record_choice(label);

        let mut narration = outcome.narration;
        if self.state().location() != &previous_location {
            narration.push_str("\n\n");
            narration.push_str(&self.scene().render());
        }

        let ending = self
            .world()
            .reached_ending(self.state())
            .map(|ending| (ending.id.clone(), ending.narration.clone()));
        if let Some((id, ending_narration)) = ending {
            narration.push_str("\n\n");
            narration.push_str(&ending_narration);
            info!(ending = %id, "Session reached an ending");
            self.status = SessionStatus::Terminated(Termination::Ending { id });
        }

        debug!(?action, dropped_changes, "Turn resolved");
        self.transcript.push(Speaker::Narrator, narration.as_str());
        self.menu = self.presenter.present(self.world(), self.state());

        self.report(
            narration,
            TurnKind::Resolved {
                action,
                dropped_changes,
            },
        )
    }

    /// Apply a delta, dropping conflicting changes until the rest applies.
    fn apply_with_recovery(&mut self, delta: StateDelta) -> usize {
        let mut delta = delta;
        let mut dropped = 0;
        loop {
            match self.store.apply(&delta) {
                Ok(_) => return dropped,
                Err(conflict) => {
                    warn!(%conflict, "Dropping conflicting change");
                    delta = delta.without(conflict.index);
                    dropped += 1;
                }
            }
        }
    }

    fn confused(&mut self, error: UnrecognizedActionError) -> TurnReport {
        debug!(%error, "Input not understood");
        let narration = self.resolver.narrate_confusion(&error);
        self.transcript.push(Speaker::Narrator, narration.as_str());
        self.report(narration, TurnKind::Confused(error))
    }

    fn report(&self, narration: String, kind: TurnKind) -> TurnReport {
        TurnReport {
            narration,
            kind,
            status: self.status.clone(),
            menu: self.is_active().then(|| self.menu.clone()),
            turn: self.state().turn(),
        }
    }
}

fn compose_opening(world: &World, state: &SessionState) -> String {
    let mut opening = String::new();
    if !world.intro().is_empty() {
        opening.push_str(world.intro());
        opening.push_str("\n\n");
    }

    let hero = world.hero(Some(state.hero())).ok();
    match hero.map(|h| h.description.as_str()).filter(|d| !d.is_empty()) {
        Some(description) => opening.push_str(&format!(
            "You are {}. {}\n\n",
            state.hero(),
            description
        )),
        None => opening.push_str(&format!("You are {}.\n\n", state.hero())),
    }

    opening.push_str(&Scene::describe(world, state).render());
    opening
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tale_state::{Change, ItemId, LocationId};

    fn begin(hero: &str) -> Session {
        let world = Arc::new(World::builtin().unwrap());
        Session::begin(world, Some(hero), &HearthtaleConfig::default()).unwrap()
    }

    #[test]
    fn test_begin_is_active_with_menu() {
        let session = begin("Wren the Wanderer");

        assert!(session.is_active());
        assert!(session.opening().contains("Whispering Wood"));
        assert!(session.opening().contains("You are Wren the Wanderer"));
        assert!((3..=4).contains(&session.present().len()));
    }

    #[test]
    fn test_choose_glowing_stone() {
        let mut session = begin("Wren the Wanderer");
        let number = session
            .present()
            .choices()
            .iter()
            .position(|c| c.label() == "Pick up the glowing stone")
            .unwrap()
            + 1;

        let report = session.take_turn(PlayerInput::Choose(number)).unwrap();

        assert!(matches!(report.kind, TurnKind::Resolved { dropped_changes: 0, .. }));
        assert_eq!(report.turn, 1);
        assert_eq!(session.state().location(), &LocationId::new("forest"));
        assert!(session.state().carries(&ItemId::new("glowing stone")));
        assert_eq!(session.state().chronicle()[0].choice, "Pick up the glowing stone");
    }

    #[test]
    fn test_free_form_unrecognized_keeps_state_and_menu() {
        let mut session = begin("Wren the Wanderer");
        let state_before = session.state().clone();
        let menu_before = session.present().clone();

        let report = session
            .take_turn(PlayerInput::FreeForm("fly to the moon".into()))
            .unwrap();

        assert!(matches!(report.kind, TurnKind::Confused(_)));
        assert_eq!(report.status, SessionStatus::Active);
        assert_eq!(session.state(), &state_before);
        assert_eq!(report.menu.as_ref(), Some(&menu_before));
        assert_eq!(report.turn, 0);
    }

    #[test]
    fn test_out_of_range_choice_is_confusion() {
        let mut session = begin("Wren the Wanderer");
        let report = session.take_turn(PlayerInput::Choose(42)).unwrap();

        match report.kind {
            TurnKind::Confused(error) => {
                assert_eq!(error.reason, UnrecognizedReason::NoSuchChoice(42))
            }
            other => panic!("unexpected turn kind {:?}", other),
        }
        assert_eq!(session.state().turn(), 0);
    }

    #[test]
    fn test_quit_terminates() {
        let mut session = begin("Wren the Wanderer");
        let report = session.take_turn(PlayerInput::Quit).unwrap();

        assert_eq!(report.kind, TurnKind::Quit);
        assert_eq!(
            session.status(),
            &SessionStatus::Terminated(Termination::PlayerQuit)
        );
        assert!(report.menu.is_none());
        assert!(matches!(
            session.take_turn(PlayerInput::Choose(1)),
            Err(SessionError::Terminated)
        ));
    }

    #[test]
    fn test_end_from_host() {
        let mut session = begin("Wren the Wanderer");
        session.end();
        assert_eq!(session.status(), &SessionStatus::Terminated(Termination::Ended));
    }

    #[test]
    fn test_conflicting_change_is_dropped() {
        let mut session = begin("Wren the Wanderer");
        let delta = StateDelta::new()
            .with(Change::Travel(LocationId::new("tower")))
            .with(Change::LearnLore("A rumour of a tower.".into()));

        let dropped = session.apply_with_recovery(delta);

        assert_eq!(dropped, 1);
        assert_eq!(session.state().location(), &LocationId::new("forest"));
        assert!(session.state().knows_lore("A rumour of a tower."));
    }

    #[test]
    fn test_travel_appends_scene() {
        let mut session = begin("Wren the Wanderer");
        let report = session
            .take_turn(PlayerInput::FreeForm("go to the clearing".into()))
            .unwrap();

        assert!(report.narration.contains("== The Moonlit Clearing =="));
        assert!(report.narration.contains("Old Maren"));
    }

    #[test]
    fn test_full_journey_reaches_ending() {
        let mut session = begin("Wren the Wanderer");
        let script = [
            "pick up the glowing stone",
            "go to the clearing",
            "head to the ruins",
            "travel to the tower",
        ];

        let mut last = None;
        for line in script {
            last = Some(session.take_turn(PlayerInput::FreeForm(line.into())).unwrap());
        }

        let last = last.unwrap();
        assert_eq!(
            last.status,
            SessionStatus::Terminated(Termination::Ending {
                id: "starwatch".into()
            })
        );
        assert!(last.narration.contains("silver cradle"));
        assert!(last.menu.is_none());
    }

    #[test]
    fn test_discovered_items_never_shrink() {
        let mut session = begin("Wren the Wanderer");
        let mut previous: BTreeSet<ItemId> = session.state().discovered_items().clone();

        for turn in 0..60 {
            if !session.is_active() {
                break;
            }
            let choice = turn % session.present().len() + 1;
            session.take_turn(PlayerInput::Choose(choice)).unwrap();

            let current = session.state().discovered_items();
            assert!(previous.is_subset(current), "discovered items shrank on turn {}", turn);
            assert!(session.state().inventory().is_subset(current));
            if session.is_active() {
                assert!((3..=4).contains(&session.present().len()));
            }
            previous = current.clone();
        }
    }

    #[test]
    fn test_transcript_records_exchange() {
        let mut session = begin("Wren the Wanderer");
        session
            .take_turn(PlayerInput::FreeForm("look around".into()))
            .unwrap();

        let entries: Vec<_> = session.transcript().entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].speaker, Speaker::Player);
        assert_eq!(entries[1].speaker, Speaker::Narrator);
    }

    #[test]
    fn test_save_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut session = begin("Wren the Wanderer");
        session
            .take_turn(PlayerInput::FreeForm("take the stone".into()))
            .unwrap();
        session.save(&path).unwrap();

        let snapshot = Session::load_snapshot(&path).unwrap();
        let world = Arc::new(World::builtin().unwrap());
        let restored = Session::restore(world, snapshot, &HearthtaleConfig::default()).unwrap();

        assert_eq!(restored.state(), session.state());
        assert_eq!(restored.present(), session.present());
        assert_eq!(restored.transcript(), session.transcript());
    }

    #[test]
    fn test_restore_honours_configured_history() {
        let mut session = begin("Wren the Wanderer");
        for _ in 0..4 {
            session
                .take_turn(PlayerInput::FreeForm("look around".into()))
                .unwrap();
        }
        assert!(session.transcript().len() > 2);

        let mut config = HearthtaleConfig::default();
        config.session.max_history = 2;
        let world = Arc::new(World::builtin().unwrap());
        let restored = Session::restore(world, session.snapshot(), &config).unwrap();

        assert_eq!(restored.transcript().len(), 2);
        assert_eq!(restored.transcript().max_history(), 2);
        assert_eq!(restored.opening(), session.opening());
    }

    #[test]
    fn test_fixed_item_by_name_is_confusion() {
        let mut session = begin("Kael the Sellsword");
        let before = session.state().clone();

        let report = session
            .take_turn(PlayerInput::FreeForm("take the anvil".into()))
            .unwrap();

        assert!(matches!(report.kind, TurnKind::Confused(_)));
        assert_eq!(report.turn, 0);
        assert_eq!(session.state(), &before);
        assert!(session.state().chronicle().is_empty());
    }

    #[test]
    fn test_hero_starting_at_an_ending() {
        let world = World::from_toml_str(
            r#"
            name = "Summit"

            [[location]]
            id = "peak"
            name = "the peak"
            description = "Nothing but sky."

            [[item]]
            id = "flag"

            [[hero]]
            name = "Climber"
            start = "peak"
            items = ["flag"]

            [[ending]]
            id = "planted"
            location = "peak"
            requires_items = ["flag"]
            narration = "The flag snaps in the wind."
            "#,
        )
        .unwrap();
        let mut session =
            Session::begin(Arc::new(world), None, &HearthtaleConfig::default()).unwrap();

        assert_eq!(
            session.status(),
            &SessionStatus::Terminated(Termination::Ending {
                id: "planted".into()
            })
        );
        assert!(session.opening().ends_with("The flag snaps in the wind."));
        assert!(matches!(
            session.take_turn(PlayerInput::Choose(1)),
            Err(SessionError::Terminated)
        ));
    }

    #[test]
    fn test_load_missing_snapshot() {
        let err = Session::load_snapshot("/no/such/save.json").unwrap_err();
        assert!(matches!(err, SessionError::File { .. }));
    }
}
