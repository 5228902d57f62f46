//! Latest-frame source

use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

/// One encoded camera frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Increases by one for every frame published on a feed
    pub sequence: u64,
    /// Encoded image bytes (JPEG)
    pub data: Bytes,
    pub received_at: Instant,
}

/// Pull-based access to the most recent frame; never blocks
pub trait FrameSource: Send + Sync {
    fn latest(&self) -> Option<Frame>;
}

impl<T: FrameSource + ?Sized> FrameSource for Arc<T> {
    fn latest(&self) -> Option<Frame> {
        (**self).latest()
    }
}

/// Single-slot frame feed: producers overwrite, consumers read the newest
pub struct FrameFeed {
    slot: watch::Sender<Option<Frame>>,
    sequence: AtomicU64,
}

impl FrameFeed {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot,
            sequence: AtomicU64::new(0),
        }
    }

    /// Replace the latest frame, returning its sequence number
    pub fn publish(&self, data: Bytes) -> u64 {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.slot.send_replace(Some(Frame {
            sequence,
            data,
            received_at: Instant::now(),
        }));
        sequence
    }

    /// Number of frames published so far
    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl Default for FrameFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FrameFeed {
    fn latest(&self) -> Option<Frame> {
        self.slot.borrow().clone()
    }
}
