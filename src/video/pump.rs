//! Frame pump - moves the newest frame to the display on a fixed cadence

use super::source::{Frame, FrameSource};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where frames end up; rendering itself is outside the console
pub trait DisplaySurface: Send {
    fn render(&mut self, frame: &Frame);
}

/// Display surface for headless runs: counts frames and logs throughput
#[derive(Debug, Default)]
pub struct LogDisplay {
    frames: u64,
    bytes: u64,
}

impl DisplaySurface for LogDisplay {
    fn render(&mut self, frame: &Frame) {
        self.frames += 1;
        self.bytes += frame.data.len() as u64;
        if self.frames % 100 == 0 {
            debug!(
                "Displayed {} frames ({} KiB, last seq={})",
                self.frames,
                self.bytes / 1024,
                frame.sequence
            );
        }
    }
}

/// Pulls frames from a source and hands new ones to a display
pub struct FramePump<S, D> {
    source: S,
    display: D,
    last_sequence: Option<u64>,
}

impl<S: FrameSource, D: DisplaySurface> FramePump<S, D> {
    pub fn new(source: S, display: D) -> Self {
        Self {
            source,
            display,
            last_sequence: None,
        }
    }

    /// Render the latest frame if it has not been shown yet
    ///
    /// Never waits: with no new frame the tick is a no-op.
    pub fn tick(&mut self) -> Option<Frame> {
        let frame = self.source.latest()?;
        if self.last_sequence == Some(frame.sequence) {
            return None;
        }
        self.last_sequence = Some(frame.sequence);
        self.display.render(&frame);
        Some(frame)
    }

    /// Tick every `period` until cancelled, returning the frames rendered
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) -> u64 {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut rendered = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if self.tick().is_some() {
                        rendered += 1;
                    }
                }
            }
        }

        info!("Frame pump stopped after {} frames", rendered);
        rendered
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
