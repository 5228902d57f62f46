//! Operator input parsing
//!
//! One command per line. Arrow-key equivalents are `w`/`a`/`s`/`d` or the
//! direction names.

use anyhow::{bail, Result};
use rover_shared::Direction;
use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  w/up  s/down  a/left  d/right   move the rover
  r, record                       toggle recording
  start | stop                    start or stop recording
  x, reset                        clear the recorded path
  p, replay                       replay the path and drive back
  cancel                          stop a running replay
  c, capture [file]               save the current frame
  status                          show console status
  q, quit                         exit";

/// An operation requested by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Move(Direction),
    ToggleRecord,
    StartRecord,
    StopRecord,
    Reset,
    Replay,
    CancelReplay,
    Capture(Option<PathBuf>),
    Status,
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let input = match command.to_ascii_lowercase().as_str() {
        "w" => ConsoleInput::Move(Direction::Up),
        "s" => ConsoleInput::Move(Direction::Down),
        "a" => ConsoleInput::Move(Direction::Left),
        "d" => ConsoleInput::Move(Direction::Right),
        "up" | "down" | "left" | "right" => ConsoleInput::Move(command.parse()?),
        "r" | "record" => ConsoleInput::ToggleRecord,
        "start" => ConsoleInput::StartRecord,
        "stop" => ConsoleInput::StopRecord,
        "x" | "reset" => ConsoleInput::Reset,
        "p" | "replay" => ConsoleInput::Replay,
        "cancel" => ConsoleInput::CancelReplay,
        "c" | "capture" => ConsoleInput::Capture(argument.map(PathBuf::from)),
        "status" => ConsoleInput::Status,
        "h" | "help" | "?" => ConsoleInput::Help,
        "q" | "quit" | "exit" => ConsoleInput::Quit,
        other => bail!("unknown command {:?} (type 'help')", other),
    };

    Ok(Some(input))
}
