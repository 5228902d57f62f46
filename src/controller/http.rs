//! HTTP motion controller client

use crate::config::ControllerConfig;
use crate::controller::traits::MotionController;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use rover_shared::{codec, timing, ConsoleError, Direction};
use std::time::Duration;

/// Sends moves as `GET /move?direction=<dir>` requests
pub struct HttpController {
    client: Client,
    address: String,
    timeout: Duration,
}

impl HttpController {
    /// Create a controller client with the configured request timeout
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            address: config.address.clone(),
            timeout: config.timeout(),
        })
    }

    /// Controller address this client talks to
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl MotionController for HttpController {
    async fn send_move(&self, direction: Direction) -> Result<(), ConsoleError> {
        let url = codec::move_url(&self.address, direction);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ConsoleError::TransportFailure(format!(
                    "no response within {}ms",
                    self.timeout.as_millis()
                ))
            } else {
                ConsoleError::TransportFailure(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == timing::MOVE_SUCCESS_STATUS {
            Ok(())
        } else {
            Err(ConsoleError::RemoteRejection { status })
        }
    }

    fn name(&self) -> &str {
        "HTTP"
    }
}
