//! Line-oriented turn loop over any reader and writer.

use std::io::{BufRead, Write};

use tracing::debug;

use super::{Session, SessionError};
use crate::choice::PlayerInput;

const PROMPT: &str = "> ";

/// Run a session to completion, reading player lines from `input`.
///
/// End of input counts as quitting. Lines that are not valid UTF-8 are
/// decoded lossily and treated like any other typed text.
pub fn play<R: BufRead, W: Write>(
    session: &mut Session,
    mut input: R,
    mut output: W,
) -> Result<(), SessionError> {
    writeln!(output, "{}", session.opening())?;
    writeln!(output, "{}", session.present())?;

    let mut line = Vec::new();
    while session.is_active() {
        write!(output, "\n{}", PROMPT)?;
        output.flush()?;

        line.clear();
        let player_input = match input.read_until(b'\n', &mut line)? {
            0 => {
                debug!("Input closed");
                PlayerInput::Quit
            }
            _ => match PlayerInput::parse(&String::from_utf8_lossy(&line)) {
                Some(player_input) => player_input,
                None => continue,
            },
        };

        let report = session.take_turn(player_input)?;
        writeln!(output, "\n{}", report.narration)?;
        if let Some(menu) = &report.menu {
            writeln!(output, "\n{}", menu)?;
        }
    }

    writeln!(output, "\nThanks for playing!")?;
    Ok(())
}
