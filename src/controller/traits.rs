//! Motion controller trait abstraction for pluggable backends

use async_trait::async_trait;
use rover_shared::{ConsoleError, Direction};

/// A remote device that actuates one move per request
#[async_trait]
pub trait MotionController: Send + Sync {
    /// Send a single move and wait for the controller's answer
    ///
    /// Returns `TransportFailure` when the controller cannot be reached in
    /// time and `RemoteRejection` when it answers with a non-success status.
    async fn send_move(&self, direction: Direction) -> Result<(), ConsoleError>;

    /// Human-readable name for this controller
    fn name(&self) -> &str;
}
