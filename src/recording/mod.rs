//! Path Recording
//!
//! Captures delivered moves with their offset from the start of the
//! recording so they can be replayed later.

mod recorder;

pub use recorder::PathRecorder;
