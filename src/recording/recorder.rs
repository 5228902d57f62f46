//! Path recorder - timestamps delivered moves while a recording is active

use rover_shared::{
    state_machine::{RecorderEvent, RecorderState, RecorderStateMachine, Transition},
    CommandEntry, DispatchOutcome, Direction, RecordedPath,
};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

struct RecordingSession {
    fsm: RecorderStateMachine,
    /// Instant the current recording started
    origin: Instant,
    path: RecordedPath,
}

/// Owns the recording session and its path
pub struct PathRecorder {
    session: RwLock<RecordingSession>,
}

impl PathRecorder {
    /// Create an idle recorder with an empty path
    pub fn new() -> Self {
        Self {
            session: RwLock::new(RecordingSession {
                fsm: RecorderStateMachine::new(),
                origin: Instant::now(),
                path: RecordedPath::new(),
            }),
        }
    }

    /// Begin a new recording, discarding the previous path
    pub async fn start_recording(&self) {
        self.apply(|_| RecorderEvent::Start).await;
    }

    /// Stop recording; the path stays readable until the next start or reset
    pub async fn stop_recording(&self) -> RecordedPath {
        self.apply(|_| RecorderEvent::Stop).await;
        self.path().await
    }

    /// Flip between recording and idle, returning the new state
    pub async fn toggle_recording(&self) -> RecorderState {
        self.apply(|fsm| {
            if fsm.is_recording() {
                RecorderEvent::Stop
            } else {
                RecorderEvent::Start
            }
        })
        .await
    }

    /// Clear the path without changing the recording state
    pub async fn reset(&self) {
        self.apply(|_| RecorderEvent::Reset).await;
    }

    /// Record a dispatch attempt
    ///
    /// Only delivered moves made while recording become part of the path.
    /// Returns whether an entry was appended.
    pub async fn on_command_dispatched(
        &self,
        direction: Direction,
        outcome: &DispatchOutcome,
    ) -> bool {
        if !outcome.is_delivered() {
            return false;
        }

        let mut session = self.session.write().await;
        if !session.fsm.is_recording() {
            return false;
        }

        let offset = session.origin.elapsed();
        session.path.push(CommandEntry::new(direction, offset));
        debug!(
            "Recorded {} at {:.3}s ({} entries)",
            direction,
            offset.as_secs_f64(),
            session.path.len()
        );
        true
    }

    /// Snapshot of the recorded path
    pub async fn path(&self) -> RecordedPath {
        self.session.read().await.path.clone()
    }

    pub async fn state(&self) -> RecorderState {
        self.session.read().await.fsm.state()
    }

    /// Pick and apply an event under a single write lock
    async fn apply<F>(&self, choose: F) -> RecorderState
    where
        F: FnOnce(&RecorderStateMachine) -> RecorderEvent,
    {
        let mut session = self.session.write().await;
        let event = choose(&session.fsm);

        match session.fsm.process_event(event) {
            Transition::Begin(state) => {
                session.path.clear();
                session.origin = Instant::now();
                info!("Recording started");
                state
            }
            Transition::Freeze(state) => {
                info!("Recording stopped. Path: {}", session.path);
                state
            }
            Transition::Clear(state) => {
                session.path.clear();
                info!("Path reset");
                state
            }
            Transition::Ignored { state, event } => {
                debug!("Recorder ignored {:?} while {:?}", event, state);
                state
            }
        }
    }
}

impl Default for PathRecorder {
    fn default() -> Self {
        Self::new()
    }
}
