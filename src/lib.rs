//! Rover Console
//!
//! Remote-control console for a camera rover: live video, directional moves,
//! and record/replay of driven paths with an automatic return trip.

pub mod command;
pub mod config;
pub mod console;
pub mod controller;
pub mod input;
pub mod recording;
pub mod replay;
pub mod video;

#[cfg(test)]
mod testing;

pub use config::ConsoleConfig;
pub use console::{ConsoleStatus, RoverConsole};
