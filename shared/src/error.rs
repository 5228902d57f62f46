//! Console error taxonomy

use thiserror::Error;

/// Errors surfaced by the dispatch and replay core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Controller unreachable: {0}")]
    TransportFailure(String),

    #[error("Controller rejected command with status {status}")]
    RemoteRejection { status: u16 },

    #[error("No path to replay")]
    EmptyPath,

    #[error("A replay is already running")]
    ConcurrentReplay,
}
