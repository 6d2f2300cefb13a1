//! Interactive hero selection.

use std::io::{BufRead, Write};

use anyhow::Result;
use tale_state::World;

/// Ask the player which hero to play.
///
/// Accepts a menu number or a hero name. A blank line or end of input picks
/// the first hero, which is returned as `None`.
pub fn choose_hero<R: BufRead, W: Write>(
    world: &World,
    mut input: R,
    mut output: W,
) -> Result<Option<String>> {
    writeln!(output, "Choose your hero:")?;
    for (i, hero) in world.heroes().iter().enumerate() {
        if hero.description.is_empty() {
            writeln!(output, "  {}. {}", i + 1, hero.name)?;
        } else {
            writeln!(output, "  {}. {} - {}", i + 1, hero.name, hero.description)?;
        }
    }

    let mut line = Vec::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        let answer = String::from_utf8_lossy(&line);
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }

        let picked = match answer.parse::<usize>() {
            Ok(number) => number
                .checked_sub(1)
                .and_then(|i| world.heroes().get(i)),
            Err(_) => world.hero(Some(answer)).ok(),
        };
        match picked {
            Some(hero) => return Ok(Some(hero.name.clone())),
            None => writeln!(output, "No hero answers to \"{}\".", answer)?,
        }
    }
}
