//! Offset waiting primitive

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Suspend until at least `offset` has elapsed since `origin`.
///
/// Never returns early. It may return late if the runtime is busy; timer
/// wake-ups are re-checked against the clock before returning.
pub async fn wait_until_elapsed(origin: Instant, offset: Duration) {
    let deadline = origin + offset;
    while Instant::now() < deadline {
        sleep_until(deadline).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_offset() {
        let origin = Instant::now();
        wait_until_elapsed(origin, Duration::from_millis(1200)).await;
        assert!(origin.elapsed() >= Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_deadline_returns_immediately() {
        let origin = Instant::now();
        tokio::time::advance(Duration::from_secs(3)).await;

        let before = Instant::now();
        wait_until_elapsed(origin, Duration::from_secs(1)).await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
