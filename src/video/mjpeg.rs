//! MJPEG stream reader with automatic reconnection

use super::source::FrameFeed;
use crate::config::VideoConfig;
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use rover_shared::codec::FrameDecoder;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Lower bound on the reconnect back-off
const MIN_RECONNECT_DELAY: Duration = Duration::from_millis(100);

/// Reads a multipart MJPEG stream and publishes each JPEG to a feed
pub struct MjpegReader {
    client: Client,
    url: String,
    feed: Arc<FrameFeed>,
    reconnect_delay: Duration,
    max_reconnect_delay: Duration,
}

impl MjpegReader {
    pub fn new(config: &VideoConfig, feed: Arc<FrameFeed>) -> Result<Self> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: config.stream_url.clone(),
            feed,
            reconnect_delay: config.reconnect_delay().max(MIN_RECONNECT_DELAY),
            max_reconnect_delay: config.max_reconnect_delay().max(MIN_RECONNECT_DELAY),
        })
    }

    /// Keep the stream open until cancelled, reconnecting with back-off
    pub async fn run(self, cancel: CancellationToken) {
        let mut reconnect_delay = self.reconnect_delay;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.stream_once() => result,
            };

            match result {
                Ok(frames) => {
                    warn!("Video stream ended after {} frames", frames);
                    if frames > 0 {
                        reconnect_delay = self.reconnect_delay;
                    }
                }
                Err(e) => {
                    error!("Unable to read video stream: {:#}", e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {}
            }

            reconnect_delay = self.next_delay(reconnect_delay);
        }

        info!("Video stream reader stopped");
    }

    /// Exponential backoff, capped at the configured maximum
    fn next_delay(&self, current: Duration) -> Duration {
        std::cmp::min(current * 2, self.max_reconnect_delay)
    }

    /// Read one connection to completion, returning the frames published
    async fn stream_once(&self) -> Result<u64> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to open video stream {}", self.url))?
            .error_for_status()
            .context("video stream returned an error status")?;

        info!("Video stream connected: {}", self.url);

        let mut body = response.bytes_stream();
        let mut decoder = FrameDecoder::new();
        let mut frames = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("video stream read failed")?;
            decoder.extend(&chunk);

            // Process all complete frames
            loop {
                match decoder.decode_next() {
                    Ok(Some(frame)) => {
                        self.feed.publish(frame);
                        frames += 1;
                    }
                    Ok(None) => break,
                    Err(e) => warn!("Dropping frame: {}", e),
                }
            }
        }

        Ok(frames)
    }
}
