//! Free-form input parsing - maps typed text onto an [`Action`].

use thiserror::Error;
use tale_state::{SessionState, World};

use crate::choice::Action;

/// Why a line of input could not be mapped to an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnrecognizedReason {
    #[error("no known verb")]
    UnknownVerb,

    #[error("'{verb}' needs something to act on")]
    MissingTarget { verb: String },

    #[error("nothing called '{target}' can be used with '{verb}' here")]
    UnavailableTarget { verb: String, target: String },

    #[error("there is no choice numbered {0}")]
    NoSuchChoice(usize),
}

/// Free-form input the resolver could not map to a state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not understand '{input}': {reason}")]
pub struct UnrecognizedActionError {
    pub input: String,
    pub reason: UnrecognizedReason,
}

impl UnrecognizedActionError {
    pub fn new(input: impl Into<String>, reason: UnrecognizedReason) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Take,
    Travel,
    Talk,
    Give,
    Examine,
    Rest,
    Inventory,
}

const VERBS: &[(Verb, &[&str])] = &[
    (
        Verb::Take,
        &["pick up", "take", "grab", "get", "collect", "pocket"],
    ),
    (
        Verb::Travel,
        &[
            "go to", "travel to", "walk to", "head to", "return to", "go", "travel", "walk",
            "head", "enter", "visit",
        ],
    ),
    (
        Verb::Talk,
        &[
            "talk to",
            "talk with",
            "speak to",
            "speak with",
            "chat with",
            "greet",
            "ask",
        ],
    ),
    (Verb::Give, &["give", "offer", "hand"]),
    (
        Verb::Examine,
        &["look around", "look", "examine", "search", "inspect", "explore"],
    ),
    (Verb::Rest, &["rest", "wait", "sleep", "sit"]),
    (
        Verb::Inventory,
        &[
            "inventory",
            "check inventory",
            "check pack",
            "check my pack",
            "check your pack",
            "check bag",
        ],
    ),
];

const FILLER_PREFIXES: &[&str] = &["i want to ", "i'd like to ", "let me ", "try to ", "please ", "i "];
const ARTICLES: &[&str] = &["the ", "a ", "an ", "my ", "some "];

/// Map free-form text onto an action available in the current state.
pub fn interpret(
    world: &World,
    state: &SessionState,
    input: &str,
) -> Result<Action, UnrecognizedActionError> {
    let normalized = normalize(input);
    let text = strip_filler(&normalized);
    let fail = |reason| UnrecognizedActionError::new(input.trim(), reason);

    let Some((verb, phrase, rest)) = split_verb(&text) else {
        return Err(fail(UnrecognizedReason::UnknownVerb));
    };
    let target = strip_articles(rest);

    let missing = || {
        fail(UnrecognizedReason::MissingTarget {
            verb: phrase.to_string(),
        })
    };
    let unavailable = |target: &str| {
        fail(UnrecognizedReason::UnavailableTarget {
            verb: phrase.to_string(),
            target: target.to_string(),
        })
    };

    match verb {
        Verb::Examine => Ok(Action::Examine),
        Verb::Rest => Ok(Action::Rest),
        Verb::Inventory => Ok(Action::Inventory),
        _ if target.is_empty() => Err(missing()),
        Verb::Take => world
            .items_portable(state)
            .into_iter()
            .find(|item| names_match(target, &[item.as_str(), world.item_name(item)]))
            .map(Action::Take)
            .ok_or_else(|| unavailable(target)),
        Verb::Travel => world
            .location(state.location())
            .into_iter()
            .flat_map(|l| l.exits.iter())
            .find(|exit| names_match(target, &[exit.as_str(), world.location_name(exit)]))
            .cloned()
            .map(Action::Travel)
            .ok_or_else(|| unavailable(target)),
        Verb::Talk => world
            .npcs_present(state)
            .into_iter()
            .find(|npc| names_match(target, &[npc.as_str(), world.npc_name(npc)]))
            .map(Action::Talk)
            .ok_or_else(|| unavailable(target)),
        Verb::Give => {
            let Some((item_text, npc_text)) = target.rsplit_once(" to ") else {
                return Err(missing());
            };
            let item_text = strip_articles(item_text);
            let npc_text = strip_articles(npc_text);

            let item = state
                .inventory()
                .iter()
                .find(|item| names_match(item_text, &[item.as_str(), world.item_name(item)]))
                .cloned()
                .ok_or_else(|| unavailable(item_text))?;
            let npc = world
                .npcs_present(state)
                .into_iter()
                .find(|npc| names_match(npc_text, &[npc.as_str(), world.npc_name(npc)]))
                .ok_or_else(|| unavailable(npc_text))?;

            Ok(Action::Give { item, npc })
        }
    }
}

/// Lowercase, drop punctuation, collapse whitespace.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_filler(text: &str) -> &str {
    let mut text = text;
    while let Some(rest) = FILLER_PREFIXES.iter().find_map(|p| text.strip_prefix(p)) {
        text = rest;
    }
    text
}

fn strip_articles(text: &str) -> &str {
    let mut text = text.trim();
    while let Some(rest) = ARTICLES.iter().find_map(|a| text.strip_prefix(a)) {
        text = rest.trim_start();
    }
    text
}

/// Find the longest verb phrase the text starts with.
fn split_verb(text: &str) -> Option<(Verb, &'static str, &str)> {
    VERBS
        .iter()
        .flat_map(|(verb, phrases)| phrases.iter().map(move |p| (*verb, *p)))
        .filter(|(_, phrase)| {
            text == *phrase
                || text
                    .strip_prefix(phrase)
                    .is_some_and(|rest| rest.starts_with(' '))
        })
        .max_by_key(|(_, phrase)| phrase.len())
        .map(|(verb, phrase)| (verb, phrase, text[phrase.len()..].trim()))
}

/// A target matches a name if it equals it or is a whole-word prefix or suffix.
fn names_match(target: &str, names: &[&str]) -> bool {
    names.iter().any(|name| {
        let name = normalize(name);
        let name = strip_articles(&name);
        name == target
            || name.ends_with(&format!(" {}", target))
            || name.starts_with(&format!("{} ", target))
    })
}
