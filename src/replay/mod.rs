//! Path Replay
//!
//! Reproduces a recorded path on its own task, then drives the rover back
//! along the reversed route.

mod clock;
mod replayer;

pub use clock::wait_until_elapsed;
pub use replayer::{PathReplayer, ReplayHandle, ReplayReport};
