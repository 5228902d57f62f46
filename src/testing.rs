//! Test doubles shared by the unit tests

use crate::controller::MotionController;
use crate::video::{DisplaySurface, Frame};
use async_trait::async_trait;
use rover_shared::{ConsoleError, Direction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Motion controller that records every move and fails on chosen calls
#[derive(Default)]
pub struct ScriptedController {
    calls: Mutex<Vec<(Direction, Instant)>>,
    failures: Mutex<HashMap<usize, ConsoleError>>,
}

impl ScriptedController {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the call with the given zero-based index fail
    pub fn fail_at(self: Arc<Self>, index: usize, error: ConsoleError) -> Arc<Self> {
        self.failures.lock().unwrap().insert(index, error);
        self
    }

    pub fn calls(&self) -> Vec<(Direction, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.calls().into_iter().map(|(d, _)| d).collect()
    }
}

#[async_trait]
impl MotionController for ScriptedController {
    async fn send_move(&self, direction: Direction) -> Result<(), ConsoleError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((direction, Instant::now()));
            calls.len() - 1
        };
        match self.failures.lock().unwrap().get(&index) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Display surface that remembers the sequence numbers it rendered
#[derive(Default)]
pub struct RecordingDisplay {
    pub rendered: Vec<u64>,
}

impl DisplaySurface for RecordingDisplay {
    fn render(&mut self, frame: &Frame) {
        self.rendered.push(frame.sequence);
    }
}
