//! Text command parsing and translation into intents

use shared::{Direction, Intent, Shape};
use thiserror::Error;

pub const HELP: &str = "commands: m <col> | < | > | l | r | d | q";

/// One line typed by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveTo(i32),
    /// Move relative to the current column of the own shape
    Shift(i32),
    Rotate(Direction),
    Drop,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`m` needs a column number")]
    MissingColumn,
    #[error("invalid column `{0}`")]
    InvalidColumn(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };

    let command = match head {
        "m" => {
            let arg = words.next().ok_or(CommandError::MissingColumn)?;
            let col = arg
                .parse()
                .map_err(|_| CommandError::InvalidColumn(arg.to_string()))?;
            Command::MoveTo(col)
        }
        "<" => Command::Shift(-1),
        ">" => Command::Shift(1),
        "l" => Command::Rotate(Direction::Left),
        "r" => Command::Rotate(Direction::Right),
        "d" => Command::Drop,
        "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(CommandError::Unknown(format!("{} {}", head, extra))),
        None => Ok(command),
    }
}

impl Command {
    /// Intent to send for this command, if any
    ///
    /// Relative moves need the own shape; without one nothing is sent.
    pub fn to_intent(self, own_shape: Option<&Shape>) -> Option<Intent> {
        match self {
            Command::MoveTo(col) => Some(Intent::MoveTo(col)),
            Command::Shift(delta) => own_shape.map(|s| Intent::MoveTo(s.col + delta)),
            Command::Rotate(direction) => Some(Intent::Rotate(direction)),
            Command::Drop => Some(Intent::Drop),
            Command::Quit => None,
        }
    }
}
