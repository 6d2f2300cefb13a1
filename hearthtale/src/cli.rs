//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// An interactive fantasy storyteller for the terminal.
#[derive(Debug, Parser)]
#[command(name = "hearthtale", version, about)]
pub struct Cli {
    /// World file (TOML). Defaults to the built-in Whispering Wood.
    #[arg(short, long)]
    pub world: Option<PathBuf>,

    /// Configuration file (TOML).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hero to play. When absent, the player is asked.
    #[arg(long)]
    pub hero: Option<String>,

    /// Resume from a saved session snapshot.
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Save a session snapshot here when play ends.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write the transcript here when play ends. Overrides the config file.
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Number of choices per menu (3 or 4). Overrides the config file.
    #[arg(long)]
    pub choices: Option<usize>,

    /// List the world's heroes and exit.
    #[arg(long)]
    pub list_heroes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "hearthtale",
            "--hero",
            "Kael the Sellsword",
            "--choices",
            "3",
            "--list-heroes",
        ]);
        assert_eq!(cli.hero.as_deref(), Some("Kael the Sellsword"));
        assert_eq!(cli.choices, Some(3));
        assert!(cli.list_heroes);
        assert!(cli.world.is_none());
    }
}
