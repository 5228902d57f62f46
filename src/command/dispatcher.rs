//! Command dispatcher - sends moves to the motion controller and reports outcomes

use crate::controller::MotionController;
use rover_shared::{DispatchOutcome, Direction};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot of dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub rejected: u64,
    pub unreachable: u64,
}

impl DispatchStats {
    pub fn total(&self) -> u64 {
        self.delivered + self.rejected + self.unreachable
    }
}

/// Dispatches moves to the controller; never fails, only reports
pub struct CommandDispatcher {
    controller: Arc<dyn MotionController>,
    delivered: AtomicU64,
    rejected: AtomicU64,
    unreachable: AtomicU64,
}

impl CommandDispatcher {
    /// Create a new command dispatcher
    pub fn new(controller: Arc<dyn MotionController>) -> Self {
        Self {
            controller,
            delivered: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            unreachable: AtomicU64::new(0),
        }
    }

    /// Send one direction and wait for the controller's answer
    ///
    /// Rejections and transport failures are logged and returned as an
    /// outcome; the caller carries on as if the move silently failed.
    pub async fn dispatch(&self, direction: Direction) -> DispatchOutcome {
        debug!("Dispatching {} via {}", direction, self.controller.name());

        let outcome = DispatchOutcome::from(self.controller.send_move(direction).await);

        match &outcome {
            DispatchOutcome::Delivered => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                info!("Command {} sent successfully", direction);
            }
            DispatchOutcome::Rejected { status } => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to send command {}: status {}", direction, status);
            }
            DispatchOutcome::Unreachable { reason } => {
                self.unreachable.fetch_add(1, Ordering::Relaxed);
                warn!("Error sending command {}: {}", direction, reason);
            }
        }

        outcome
    }

    /// Get a snapshot of the dispatch counters
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
        }
    }
}
