//! Command dispatch for the rover
//!
//! This module handles:
//! - Sending a single direction to the motion controller
//! - Mapping transport results to dispatch outcomes
//! - Tracking per-outcome counters

mod dispatcher;

pub use dispatcher::{CommandDispatcher, DispatchStats};
