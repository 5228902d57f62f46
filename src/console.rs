//! Rover console - the operations exposed to the operator surface
//!
//! Live moves go through the dispatcher and are then offered to the recorder.
//! Replays take a snapshot of the recorded path and run on their own task.

use crate::command::{CommandDispatcher, DispatchStats};
use crate::config::ConsoleConfig;
use crate::controller::MotionController;
use crate::recording::PathRecorder;
use crate::replay::{PathReplayer, ReplayHandle};
use crate::video::{default_capture_path, save_frame, FrameSource};
use anyhow::{anyhow, Result};
use rover_shared::{
    state_machine::{RecorderState, ReplayPhase},
    ConsoleError, DispatchOutcome, Direction, RecordedPath,
};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Point-in-time view of the console for status display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleStatus {
    pub recorder: RecorderState,
    pub path_len: usize,
    pub replay: Option<ReplayPhase>,
    pub replay_running: bool,
    pub dispatch: DispatchStats,
    /// Time since the newest camera frame arrived
    pub frame_age: Option<Duration>,
}

impl fmt::Display for ConsoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let replay = match (self.replay_running, self.replay) {
            (true, Some(phase)) => format!("running ({})", phase),
            (false, Some(phase)) => format!("last {}", phase),
            (_, None) => "none".to_string(),
        };
        let video = match self.frame_age {
            Some(age) => format!("{}ms old", age.as_millis()),
            None => "no frames".to_string(),
        };
        write!(
            f,
            "recorder={:?} path={} entries replay={} video={} commands: {} delivered, {} rejected, {} unreachable",
            self.recorder,
            self.path_len,
            replay,
            video,
            self.dispatch.delivered,
            self.dispatch.rejected,
            self.dispatch.unreachable
        )
    }
}

/// The console's public API
pub struct RoverConsole {
    dispatcher: Arc<CommandDispatcher>,
    recorder: PathRecorder,
    replayer: PathReplayer,
    frames: Arc<dyn FrameSource>,
    capture_dir: PathBuf,
}

impl RoverConsole {
    pub fn new(
        controller: Arc<dyn MotionController>,
        frames: Arc<dyn FrameSource>,
        config: &ConsoleConfig,
    ) -> Self {
        let dispatcher = Arc::new(CommandDispatcher::new(controller));
        let replayer = PathReplayer::new(dispatcher.clone(), config.replay.clone());

        Self {
            dispatcher,
            recorder: PathRecorder::new(),
            replayer,
            frames,
            capture_dir: config.video.capture_dir.clone(),
        }
    }

    /// Send a live move; delivered moves are recorded while recording
    pub async fn issue(&self, direction: Direction) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(direction).await;
        self.recorder.on_command_dispatched(direction, &outcome).await;
        outcome
    }

    pub async fn start_recording(&self) {
        self.recorder.start_recording().await;
    }

    pub async fn stop_recording(&self) -> RecordedPath {
        self.recorder.stop_recording().await
    }

    /// Single-button record control
    pub async fn toggle_recording(&self) -> RecorderState {
        self.recorder.toggle_recording().await
    }

    pub async fn reset_path(&self) {
        self.recorder.reset().await;
    }

    pub async fn path(&self) -> RecordedPath {
        self.recorder.path().await
    }

    /// Replay the recorded path and drive back along it
    ///
    /// The path is copied first; later resets or recordings do not affect a
    /// running replay.
    pub async fn replay(&self) -> Result<ReplayHandle, ConsoleError> {
        let snapshot = self.recorder.path().await;
        self.replayer.replay(snapshot)
    }

    /// Stop the running replay, leaving the rover where it is
    pub fn cancel_replay(&self) {
        self.replayer.shutdown();
    }

    /// Save the latest camera frame, returning the file written
    pub async fn capture_still(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        let frame = self
            .frames
            .latest()
            .ok_or_else(|| anyhow!("no video frame available yet"))?;
        let path = path.unwrap_or_else(|| default_capture_path(&self.capture_dir));

        save_frame(&frame, &path).await?;
        info!("Image saved as {}", path.display());
        Ok(path)
    }

    pub async fn status(&self) -> ConsoleStatus {
        ConsoleStatus {
            recorder: self.recorder.state().await,
            path_len: self.recorder.path().await.len(),
            replay: self.replayer.phase(),
            replay_running: self.replayer.is_running(),
            dispatch: self.dispatcher.stats(),
            frame_age: self.frames.latest().map(|frame| frame.received_at.elapsed()),
        }
    }

    /// Stop background work owned by the console
    pub fn shutdown(&self) {
        self.replayer.shutdown();
    }
}
