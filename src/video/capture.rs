//! Still capture

use super::source::Frame;
use anyhow::{Context, Result};
use rover_shared::now_ms;
use std::path::{Path, PathBuf};

/// Timestamped file name for a still in the capture directory
pub fn default_capture_path(dir: &Path) -> PathBuf {
    dir.join(format!("capture-{}.jpg", now_ms()))
}

/// Write a frame's JPEG bytes to a file
pub async fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    tokio::fs::write(path, &frame.data)
        .await
        .with_context(|| format!("failed to write image {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_save_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_capture_path(dir.path());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));

        let frame = Frame {
            sequence: 1,
            data: Bytes::from_static(&[0xFF, 0xD8, 0x01, 0xFF, 0xD9]),
            received_at: Instant::now(),
        };
        save_frame(&frame, &path).await.unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, frame.data.to_vec());
    }

    #[tokio::test]
    async fn test_save_frame_missing_dir() {
        let frame = Frame {
            sequence: 1,
            data: Bytes::from_static(b"x"),
            received_at: Instant::now(),
        };
        let result = save_frame(&frame, Path::new("/nonexistent/dir/still.jpg")).await;
        assert!(result.is_err());
    }
}
