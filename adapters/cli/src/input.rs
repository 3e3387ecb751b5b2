//! Parsing of the commands typed during play.

use anyhow::{bail, Context, Result};
use pipeflow_core::{Command, Coordinate, Replacement};

/// Usage text printed by `help`.
pub(crate) const HELP: &str = "\
commands:
  place R C [cross]  place the next pipe at row R, column C
  skip               discard the next pipe
  undo               take back the last unfilled placement
  pause | resume     suspend or resume the flow
  board              print the board again
  help               show this text
  quit               leave the game";

/// A line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerInput {
    /// A session command.
    Command(Command),
    /// Redraw the board.
    Board,
    /// Print the command list.
    Help,
    /// Leave the game.
    Quit,
}

/// Parses one line, ignoring case and surrounding whitespace.
pub(crate) fn parse(line: &str) -> Result<PlayerInput> {
    let lowered = line.trim().to_ascii_lowercase();
    let mut words = lowered.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty command, type 'help' for a list");
    };

    let input = match verb {
        "place" | "p" => {
            let row = coordinate_part(words.next(), "row")?;
            let col = coordinate_part(words.next(), "column")?;
            let replacement = match words.next() {
                None => Replacement::Keep,
                Some("cross" | "x") => Replacement::Cross,
                Some(other) => bail!("expected 'cross', found '{other}'"),
            };
            PlayerInput::Command(Command::PlacePipe {
                coord: Coordinate::new(row, col),
                replacement,
            })
        }
        "skip" | "s" => PlayerInput::Command(Command::SkipPipe),
        "undo" | "u" => PlayerInput::Command(Command::UndoStep),
        "pause" => PlayerInput::Command(Command::Pause),
        "resume" => PlayerInput::Command(Command::Resume),
        "board" | "b" => PlayerInput::Board,
        "help" | "?" => PlayerInput::Help,
        "quit" | "q" | "exit" => PlayerInput::Quit,
        other => bail!("unknown command '{other}', type 'help' for a list"),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected '{extra}' after '{verb}'");
    }
    Ok(input)
}

fn coordinate_part(word: Option<&str>, name: &str) -> Result<u32> {
    let word = word.with_context(|| format!("missing {name}"))?;
    word.parse()
        .with_context(|| format!("{name} must be a non-negative number, found '{word}'"))
}
