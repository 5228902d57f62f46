//! Path replayer - forward pass, turn maneuver, reverse pass
//!
//! Each replay runs on its own task so the input loop and frame pump keep
//! running. Only one replay may run at a time per replayer; a second request
//! is rejected rather than queued.

use super::clock::wait_until_elapsed;
use crate::command::CommandDispatcher;
use crate::config::ReplayConfig;
use rover_shared::{
    state_machine::ReplayPhase, CommandEntry, ConsoleError, DispatchOutcome, Direction,
    RecordedPath,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Summary of a finished replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Dispatch attempts made, turn included
    pub dispatched: usize,
    /// Attempts that were not delivered
    pub failed: usize,
    /// Replay was stopped before the reverse pass finished
    pub cancelled: bool,
}

/// Handle to a running replay
pub struct ReplayHandle {
    task: JoinHandle<ReplayReport>,
    cancel: CancellationToken,
    phase: watch::Receiver<Option<ReplayPhase>>,
}

impl ReplayHandle {
    /// Current phase of this replay
    pub fn phase(&self) -> Option<ReplayPhase> {
        *self.phase.borrow()
    }

    /// Stop the replay at its next wait or dispatch
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the replay to end and return its report
    pub async fn join(self) -> ReplayReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                error!("Replay task failed: {}", e);
                ReplayReport {
                    cancelled: true,
                    ..Default::default()
                }
            }
        }
    }
}

/// Clears the running flag when the replay task ends, however it ends
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts replays and enforces one-at-a-time
pub struct PathReplayer {
    dispatcher: Arc<CommandDispatcher>,
    config: ReplayConfig,
    running: Arc<AtomicBool>,
    /// Cancellation token of the most recent replay
    active: Mutex<Option<CancellationToken>>,
    /// Mirror of the most recent run's phase
    phase_tx: watch::Sender<Option<ReplayPhase>>,
}

impl PathReplayer {
    /// Create a new replayer
    pub fn new(dispatcher: Arc<CommandDispatcher>, config: ReplayConfig) -> Self {
        let (phase_tx, _) = watch::channel(None);
        Self {
            dispatcher,
            config,
            running: Arc::new(AtomicBool::new(false)),
            active: Mutex::new(None),
            phase_tx,
        }
    }

    /// Start replaying a snapshot of a recorded path
    ///
    /// Returns `EmptyPath` when there is nothing to replay and
    /// `ConcurrentReplay` when a replay is still running.
    pub fn replay(&self, path: RecordedPath) -> Result<ReplayHandle, ConsoleError> {
        if path.is_empty() {
            info!("No path to replay.");
            return Err(ConsoleError::EmptyPath);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Replay requested while another replay is running");
            return Err(ConsoleError::ConcurrentReplay);
        }
        let guard = RunningGuard(self.running.clone());

        let cancel = CancellationToken::new();
        if let Ok(mut active) = self.active.lock() {
            *active = Some(cancel.clone());
        }

        let (run_phase_tx, run_phase_rx) = watch::channel(None);
        let run = ReplayRun {
            dispatcher: self.dispatcher.clone(),
            dwell: self.config.dwell(),
            settle: self.config.settle(),
            turn: self.config.turn,
            path,
            cancel: cancel.clone(),
            phase_tx: run_phase_tx,
            mirror_tx: self.phase_tx.clone(),
            report: ReplayReport::default(),
        };

        let task = tokio::spawn(async move {
            let _guard = guard;
            run.execute().await
        });

        Ok(ReplayHandle {
            task,
            cancel,
            phase: run_phase_rx,
        })
    }

    /// Whether a replay task is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Phase of the most recent replay, `None` if nothing was replayed yet
    pub fn phase(&self) -> Option<ReplayPhase> {
        *self.phase_tx.borrow()
    }

    /// Cancel the running replay, if any
    pub fn shutdown(&self) {
        if let Ok(active) = self.active.lock() {
            if let Some(cancel) = active.as_ref() {
                cancel.cancel();
            }
        }
    }
}

/// State of one replay task
struct ReplayRun {
    dispatcher: Arc<CommandDispatcher>,
    dwell: Duration,
    settle: Duration,
    turn: Direction,
    path: RecordedPath,
    cancel: CancellationToken,
    /// Phase of this run only, read through its handle
    phase_tx: watch::Sender<Option<ReplayPhase>>,
    mirror_tx: watch::Sender<Option<ReplayPhase>>,
    report: ReplayReport,
}

impl ReplayRun {
    async fn execute(mut self) -> ReplayReport {
        info!(
            "Replaying path of {} entries ({:.2}s)",
            self.path.len(),
            self.path.duration().as_secs_f64()
        );

        match self.run_phases().await {
            Some(()) => {
                self.set_phase(ReplayPhase::Completed);
                info!(
                    "Return trip completed: {} commands, {} failed",
                    self.report.dispatched, self.report.failed
                );
            }
            None => {
                self.report.cancelled = true;
                self.set_phase(ReplayPhase::Cancelled);
                warn!(
                    "Replay cancelled after {} commands",
                    self.report.dispatched
                );
            }
        }

        self.report
    }

    /// Runs forward pass, turn and reverse pass; `None` once cancelled
    async fn run_phases(&mut self) -> Option<()> {
        self.set_phase(ReplayPhase::Forward);
        let forward: Vec<CommandEntry> = self.path.entries().to_vec();
        self.play(&forward).await?;

        self.set_phase(ReplayPhase::Dwell);
        info!(
            "Path replay completed. Pausing for {:.1}s.",
            self.dwell.as_secs_f64()
        );
        self.wait(Instant::now(), self.dwell).await?;

        self.set_phase(ReplayPhase::Turn);
        info!("Turning around ({})", self.turn);
        self.dispatch(self.turn).await?;

        self.set_phase(ReplayPhase::Settle);
        self.wait(Instant::now(), self.settle).await?;

        self.set_phase(ReplayPhase::Reverse);
        info!("Reversing path.");
        let back: Vec<CommandEntry> = self.path.return_trip().collect();
        self.play(&back).await
    }

    /// Dispatch entries at their offsets from a fresh origin
    async fn play(&mut self, entries: &[CommandEntry]) -> Option<()> {
        let origin = Instant::now();
        for entry in entries {
            self.wait(origin, entry.offset).await?;
            self.dispatch(entry.direction).await?;
        }
        Some(())
    }

    async fn wait(&self, origin: Instant, offset: Duration) -> Option<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            _ = wait_until_elapsed(origin, offset) => Some(()),
        }
    }

    async fn dispatch(&mut self, direction: Direction) -> Option<()> {
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            outcome = self.dispatcher.dispatch(direction) => outcome,
        };

        self.report.dispatched += 1;
        if outcome != DispatchOutcome::Delivered {
            self.report.failed += 1;
            warn!("Replay command {} not delivered ({}), continuing", direction, outcome);
        }
        Some(())
    }

    fn set_phase(&self, phase: ReplayPhase) {
        self.phase_tx.send_replace(Some(phase));
        self.mirror_tx.send_replace(Some(phase));
    }
}
