//! Rover Shared Types
//!
//! This crate provides the direction, path and wire types shared between the
//! rover console and the motion controller simulator.

pub mod codec;
pub mod error;
pub mod state_machine;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use codec::WireError;
pub use error::ConsoleError;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Default timing parameters for dispatch and replay
pub mod timing {
    /// Per-request timeout for a move command
    pub const DISPATCH_TIMEOUT_MS: u64 = 5000;

    /// Pause between the end of the forward pass and the turn maneuver
    pub const REPLAY_DWELL_MS: u64 = 30_000;

    /// Time allowed for the turn maneuver to complete physically
    pub const REPLAY_SETTLE_MS: u64 = 2000;

    /// Frame pump period
    pub const FRAME_PERIOD_MS: u64 = 10;

    /// HTTP status the motion controller answers with on success
    pub const MOVE_SUCCESS_STATUS: u16 = 200;
}

/// One of the four primitive move commands understood by the motion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Wire name of the direction
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// The command that undoes this one on the return trip
    pub fn inverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(WireError::UnknownDirection(other.to_string())),
        }
    }
}

/// A recorded move: the direction and when it was issued relative to the
/// start of the recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub direction: Direction,
    pub offset: Duration,
}

impl CommandEntry {
    pub fn new(direction: Direction, offset: Duration) -> Self {
        Self { direction, offset }
    }
}

/// Ordered sequence of recorded moves. Insertion order is playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedPath {
    entries: Vec<CommandEntry>,
}

impl RecordedPath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    ///
    /// Offsets must not go backwards; an entry earlier than the last one is
    /// clamped to the last offset.
    pub fn push(&mut self, entry: CommandEntry) {
        let floor = self.duration();
        self.entries.push(CommandEntry {
            direction: entry.direction,
            offset: entry.offset.max(floor),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Offset of the last entry, zero for an empty path
    pub fn duration(&self) -> Duration {
        self.entries
            .last()
            .map(|e| e.offset)
            .unwrap_or(Duration::ZERO)
    }

    /// Entries for the return trip: reversed order, inverted directions,
    /// original offsets
    pub fn return_trip(&self) -> impl Iterator<Item = CommandEntry> + '_ {
        self.entries
            .iter()
            .rev()
            .map(|e| CommandEntry::new(e.direction.inverse(), e.offset))
    }
}

impl FromIterator<CommandEntry> for RecordedPath {
    fn from_iter<I: IntoIterator<Item = CommandEntry>>(iter: I) -> Self {
        let mut path = RecordedPath::new();
        for entry in iter {
            path.push(entry);
        }
        path
    }
}

impl fmt::Display for RecordedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {:.2}s)", entry.direction, entry.offset.as_secs_f64())?;
        }
        write!(f, "]")
    }
}

/// Result of sending one move command to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Controller acknowledged with the success status
    Delivered,
    /// Controller reachable but answered with another status
    Rejected { status: u16 },
    /// Network failure or timeout
    Unreachable { reason: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

impl From<Result<(), ConsoleError>> for DispatchOutcome {
    fn from(result: Result<(), ConsoleError>) -> Self {
        match result {
            Ok(()) => DispatchOutcome::Delivered,
            Err(ConsoleError::RemoteRejection { status }) => DispatchOutcome::Rejected { status },
            Err(e) => DispatchOutcome::Unreachable {
                reason: e.to_string(),
            },
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Delivered => write!(f, "delivered"),
            DispatchOutcome::Rejected { status } => write!(f, "rejected (status {})", status),
            DispatchOutcome::Unreachable { reason } => write!(f, "unreachable: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_direction_inverse() {
        assert_eq!(Direction::Up.inverse(), Direction::Down);
        assert_eq!(Direction::Down.inverse(), Direction::Up);
        assert_eq!(Direction::Left.inverse(), Direction::Right);
        assert_eq!(Direction::Right.inverse(), Direction::Left);
        for d in Direction::ALL {
            assert_eq!(d.inverse().inverse(), d);
        }
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" LEFT ".parse::<Direction>().unwrap(), Direction::Left);
        assert!(matches!(
            "forward".parse::<Direction>(),
            Err(WireError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_return_trip_order() {
        let path: RecordedPath = [
            CommandEntry::new(Direction::Up, secs(0.0)),
            CommandEntry::new(Direction::Left, secs(1.2)),
            CommandEntry::new(Direction::Up, secs(2.5)),
        ]
        .into_iter()
        .collect();

        let back: Vec<_> = path.return_trip().collect();
        assert_eq!(
            back,
            vec![
                CommandEntry::new(Direction::Down, secs(2.5)),
                CommandEntry::new(Direction::Right, secs(1.2)),
                CommandEntry::new(Direction::Down, secs(0.0)),
            ]
        );
    }

    #[test]
    fn test_push_keeps_offsets_monotonic() {
        let mut path = RecordedPath::new();
        path.push(CommandEntry::new(Direction::Up, secs(2.0)));
        path.push(CommandEntry::new(Direction::Down, secs(1.0)));
        assert_eq!(path.entries()[1].offset, secs(2.0));
        assert_eq!(path.duration(), secs(2.0));
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(DispatchOutcome::from(Ok(())), DispatchOutcome::Delivered);
        assert_eq!(
            DispatchOutcome::from(Err(ConsoleError::RemoteRejection { status: 500 })),
            DispatchOutcome::Rejected { status: 500 }
        );
        assert!(matches!(
            DispatchOutcome::from(Err(ConsoleError::TransportFailure("refused".into()))),
            DispatchOutcome::Unreachable { .. }
        ));
    }

    #[test]
    fn test_path_display() {
        let path: RecordedPath = [CommandEntry::new(Direction::Right, secs(1.5))]
            .into_iter()
            .collect();
        assert_eq!(path.to_string(), "[(right, 1.50s)]");
    }
}
