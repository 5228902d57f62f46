//! Console configuration
//!
//! Every address and timing constant the console uses lives here. Defaults
//! match the stock rover setup; any subset can be overridden from a TOML file.

use anyhow::{bail, Context, Result};
use rover_shared::{timing, Direction};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Motion controller connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Controller address (host, host:port, or http URL)
    pub address: String,
    /// Per-command request timeout
    pub timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            address: "192.168.1.14".into(),
            timeout_ms: timing::DISPATCH_TIMEOUT_MS,
        }
    }
}

impl ControllerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Camera stream and display settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// MJPEG stream URL
    pub stream_url: String,
    /// Frame pump period
    pub frame_period_ms: u64,
    /// Directory for captured stills
    pub capture_dir: PathBuf,
    /// Reconnection delay (initial)
    pub reconnect_delay_ms: u64,
    /// Maximum reconnection delay
    pub max_reconnect_delay_ms: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            stream_url: "http://192.168.1.11:8080/video".into(),
            frame_period_ms: timing::FRAME_PERIOD_MS,
            capture_dir: PathBuf::from("."),
            reconnect_delay_ms: 1000,
            max_reconnect_delay_ms: 30_000,
        }
    }
}

impl VideoConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }
}

/// Return-trip maneuver settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Pause after the forward pass before turning
    pub dwell_ms: u64,
    /// Pause after the turn before the reverse pass
    pub settle_ms: u64,
    /// Command issued to turn the rover around
    pub turn: Direction,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            dwell_ms: timing::REPLAY_DWELL_MS,
            settle_ms: timing::REPLAY_SETTLE_MS,
            turn: Direction::Right,
        }
    }
}

impl ReplayConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Top-level console configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub controller: ControllerConfig,
    pub video: VideoConfig,
    pub replay: ReplayConfig,
}

impl ConsoleConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or crash a running console
    pub fn validate(&self) -> Result<()> {
        if self.controller.timeout_ms == 0 {
            bail!("controller.timeout_ms must be greater than zero");
        }
        if self.video.frame_period_ms == 0 {
            bail!("video.frame_period_ms must be greater than zero");
        }
        if self.video.reconnect_delay_ms == 0 {
            bail!("video.reconnect_delay_ms must be greater than zero");
        }
        if self.video.max_reconnect_delay_ms < self.video.reconnect_delay_ms {
            bail!(
                "video.max_reconnect_delay_ms ({}) is below video.reconnect_delay_ms ({})",
                self.video.max_reconnect_delay_ms,
                self.video.reconnect_delay_ms
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.controller.timeout(), Duration::from_secs(5));
        assert_eq!(config.replay.dwell(), Duration::from_secs(30));
        assert_eq!(config.replay.settle(), Duration::from_secs(2));
        assert_eq!(config.replay.turn, Direction::Right);
        assert_eq!(config.video.frame_period(), Duration::from_millis(10));
    }

    #[test]
    fn test_partial_override() {
        let config = ConsoleConfig::from_toml(
            r#"
            [controller]
            address = "10.0.0.7:8080"

            [replay]
            dwell_ms = 500
            turn = "left"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.controller.address, "10.0.0.7:8080");
        assert_eq!(config.controller.timeout_ms, timing::DISPATCH_TIMEOUT_MS);
        assert_eq!(config.replay.dwell(), Duration::from_millis(500));
        assert_eq!(config.replay.settle_ms, timing::REPLAY_SETTLE_MS);
        assert_eq!(config.replay.turn, Direction::Left);
    }

    #[test]
    fn test_rejects_unknown_turn() {
        let result = ConsoleConfig::from_toml("[replay]\nturn = \"spin\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_frame_period() {
        let err = ConsoleConfig::from_toml("[video]\nframe_period_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("frame_period_ms"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = ConsoleConfig::from_toml("[controller]\ntimeout_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_rejects_zero_reconnect_delay() {
        let err = ConsoleConfig::from_toml("[video]\nreconnect_delay_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("reconnect_delay_ms"));
    }

    #[test]
    fn test_rejects_max_reconnect_below_initial() {
        let result = ConsoleConfig::from_toml(
            "[video]\nreconnect_delay_ms = 5000\nmax_reconnect_delay_ms = 1000\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_after_override() {
        let mut config = ConsoleConfig::default();
        assert!(config.validate().is_ok());

        config.video.frame_period_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rover.toml");
        std::fs::write(&path, "[video]\nframe_period_ms = 0\n").unwrap();

        let err = ConsoleConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("frame_period_ms"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConsoleConfig::load(Path::new("/nonexistent/rover.toml"));
        assert!(result.is_err());
    }
}
