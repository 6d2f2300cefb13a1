//! Hearthtale - terminal composition root.

mod cli;
mod hero_select;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use narrative_core::{play, HearthtaleConfig, Session};
use tale_state::World;

use crate::cli::Cli;

const DEFAULT_LOG_FILTER: &str = "hearthtale=info,narrative_core=info,tale_state=warn";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    tracing::info!("Starting Hearthtale");

    let world = match &cli.world {
        Some(path) => World::load(path)
            .with_context(|| format!("loading world from {}", path.display()))?,
        None => World::builtin().context("loading built-in world")?,
    };
    let world = Arc::new(world);

    if cli.list_heroes {
        for hero in world.heroes() {
            println!("{}: {}", hero.name, hero.description);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => HearthtaleConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HearthtaleConfig::default(),
    };
    if let Some(choices) = cli.choices {
        config.presenter.max_choices = choices;
    }
    if let Some(path) = &cli.transcript {
        config.transcript_path = Some(path.clone());
    }

    let mut session = match &cli.resume {
        Some(path) => {
            let snapshot = Session::load_snapshot(path)?;
            Session::restore(world, snapshot, &config)?
        }
        None => {
            let hero = match &cli.hero {
                Some(hero) => Some(hero.clone()),
                None if world.heroes().len() > 1 => {
                    hero_select::choose_hero(&world, std::io::stdin().lock(), std::io::stdout())?
                }
                None => None,
            };
            Session::begin(world, hero.as_deref(), &config)?
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    play(&mut session, stdin.lock(), stdout.lock())?;

    if let Some(path) = &config.transcript_path {
        session
            .transcript()
            .save_json(path)
            .with_context(|| format!("writing transcript to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Transcript saved");
    }

    if let Some(path) = &cli.save {
        session.save(path)?;
        tracing::info!(path = %path.display(), "Session saved");
    }

    Ok(())
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = cli
        .log_file
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}
