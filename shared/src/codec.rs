//! Wire formats used by the console
//!
//! Move commands go to the motion controller as a plain HTTP request:
//! ```text
//! GET http://<controller>/move?direction=<up|down|left|right>
//! ```
//!
//! Video arrives as a multipart MJPEG stream. Frames are located by their
//! JPEG markers, so the multipart boundaries and part headers can be ignored:
//! ```text
//! [ ...part headers... ][ FF D8 ...jpeg data... FF D9 ][ ...next part... ]
//! ```

use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error;

use crate::Direction;

/// Path of the move endpoint on the motion controller
pub const MOVE_PATH: &str = "/move";

/// Query parameter carrying the direction
pub const DIRECTION_PARAM: &str = "direction";

/// Maximum size of a single JPEG frame (8 MB) to prevent memory exhaustion
pub const MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Errors that can occur while decoding wire data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Unknown direction: {0:?}")]
    UnknownDirection(String),

    #[error("Frame too large: {0} bytes without end marker (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),
}

/// Build the move request URL for a controller base address
///
/// The base may be a bare host (`192.168.1.14`), host and port, or a full
/// `http://` URL.
pub fn move_url(base: &str, direction: Direction) -> String {
    let base = base.trim().trim_end_matches('/');
    let scheme = if base.contains("://") { "" } else { "http://" };
    format!(
        "{}{}{}?{}={}",
        scheme,
        base,
        MOVE_PATH,
        DIRECTION_PARAM,
        direction.as_str()
    )
}

/// Try to cut the next complete JPEG frame out of a buffer
///
/// `scanned` is how far the pending frame has already been searched for its
/// end marker; it is advanced on a miss and reset once the frame is cut or
/// dropped, so chunked frames are scanned once.
///
/// Returns:
/// - `Ok(Some(frame))` if a complete frame was found
/// - `Ok(None)` if more data is needed
/// - `Err(...)` if the pending frame grew past [`MAX_FRAME_SIZE`]; the
///   buffer is cleared so decoding can resync on the next frame
pub fn decode(buf: &mut BytesMut, scanned: &mut usize) -> Result<Option<Bytes>, WireError> {
    let start = match find_marker(buf, 0, JPEG_SOI) {
        Some(pos) => pos,
        None => {
            // A trailing 0xFF may be the first half of a split marker
            let keep = usize::from(buf.last() == Some(&0xFF));
            let skip = buf.len() - keep;
            buf.advance(skip);
            *scanned = 0;
            return Ok(None);
        }
    };

    // Discard part headers in front of the frame
    if start > 0 {
        buf.advance(start);
        *scanned = 0;
    }

    // Back up one byte in case the end marker straddles two chunks
    let from = JPEG_SOI.len().max(scanned.saturating_sub(1));
    match find_marker(buf, from, JPEG_EOI) {
        Some(end) => {
            *scanned = 0;
            Ok(Some(buf.split_to(end + JPEG_EOI.len()).freeze()))
        }
        None if buf.len() > MAX_FRAME_SIZE => {
            let len = buf.len();
            buf.clear();
            *scanned = 0;
            Err(WireError::FrameTooLarge(len))
        }
        None => {
            *scanned = buf.len();
            Ok(None)
        }
    }
}

fn find_marker(buf: &[u8], from: usize, marker: [u8; 2]) -> Option<usize> {
    if buf.len() < from + marker.len() {
        return None;
    }
    buf[from..]
        .windows(marker.len())
        .position(|w| w == marker)
        .map(|pos| pos + from)
}

/// Streaming decoder for MJPEG byte chunks
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Partial frame data being accumulated
    buffer: BytesMut,
    /// Bytes of the pending frame already searched for the end marker
    scanned: usize,
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            scanned: 0,
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next frame from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete frames
    pub fn decode_next(&mut self) -> Result<Option<Bytes>, WireError> {
        decode(&mut self.buffer, &mut self.scanned)
    }

    /// Get the current buffer length (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(body: &[u8]) -> Vec<u8> {
        let mut v = JPEG_SOI.to_vec();
        v.extend_from_slice(body);
        v.extend_from_slice(&JPEG_EOI);
        v
    }

    fn part(body: &[u8]) -> Vec<u8> {
        let frame = jpeg(body);
        let mut v = format!(
            "--myboundary\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            frame.len()
        )
        .into_bytes();
        v.extend_from_slice(&frame);
        v.extend_from_slice(b"\r\n");
        v
    }

    #[test]
    fn test_move_url() {
        assert_eq!(
            move_url("192.168.1.14", Direction::Up),
            "http://192.168.1.14/move?direction=up"
        );
        assert_eq!(
            move_url("http://127.0.0.1:8080/", Direction::Left),
            "http://127.0.0.1:8080/move?direction=left"
        );
    }

    #[test]
    fn test_partial_decode() {
        let data = part(b"abc");

        let mut decoder = FrameDecoder::new();
        decoder.extend(&data[..data.len() - 5]);
        assert!(decoder.decode_next().expect("decode error").is_none());

        decoder.extend(&data[data.len() - 5..]);
        let frame = decoder
            .decode_next()
            .expect("decode error")
            .expect("should have frame");
        assert_eq!(&frame[..], &jpeg(b"abc")[..]);
    }

    #[test]
    fn test_marker_split_across_chunks() {
        let data = part(b"xyz");
        // Split right between 0xFF and 0xD8 of the start marker
        let soi = data
            .windows(2)
            .position(|w| w == JPEG_SOI)
            .expect("start marker");

        let mut decoder = FrameDecoder::new();
        decoder.extend(&data[..soi + 1]);
        assert!(decoder.decode_next().expect("decode error").is_none());
        assert_eq!(decoder.buffer_len(), 1);

        decoder.extend(&data[soi + 1..]);
        let frame = decoder.decode_next().expect("decode error");
        assert_eq!(frame.as_deref(), Some(&jpeg(b"xyz")[..]));
    }

    #[test]
    fn test_multiple_frames() {
        let mut data = part(b"one");
        data.extend(part(b"two"));

        let mut decoder = FrameDecoder::new();
        decoder.extend(&data);

        let first = decoder.decode_next().expect("decode error").expect("frame");
        let second = decoder.decode_next().expect("decode error").expect("frame");
        assert_eq!(&first[..], &jpeg(b"one")[..]);
        assert_eq!(&second[..], &jpeg(b"two")[..]);
        assert!(decoder.decode_next().expect("decode error").is_none());
    }

    #[test]
    fn test_frame_too_large() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&JPEG_SOI);
        buf.extend_from_slice(&vec![0u8; MAX_FRAME_SIZE]);

        let mut scanned = 0;
        let result = decode(&mut buf, &mut scanned);
        assert!(matches!(result, Err(WireError::FrameTooLarge(_))));
        assert!(buf.is_empty());
        assert_eq!(scanned, 0);
    }

    #[test]
    fn test_end_marker_split_across_chunks() {
        let data = jpeg(b"split-end");
        let eoi = data.len() - JPEG_EOI.len();

        let mut decoder = FrameDecoder::new();
        // Everything up to and including the 0xFF of the end marker
        decoder.extend(&data[..eoi + 1]);
        assert!(decoder.decode_next().expect("decode error").is_none());
        assert_eq!(decoder.scanned, eoi + 1);

        decoder.extend(&data[eoi + 1..]);
        let frame = decoder.decode_next().expect("decode error");
        assert_eq!(frame.as_deref(), Some(&data[..]));
        assert_eq!(decoder.scanned, 0);
    }

    #[test]
    fn test_chunked_frame_is_scanned_incrementally() {
        let body = vec![0x11u8; 4096];
        let data = jpeg(&body);

        let mut decoder = FrameDecoder::new();
        for chunk in data[..data.len() - 1].chunks(100) {
            decoder.extend(chunk);
            assert!(decoder.decode_next().expect("decode error").is_none());
            // Cursor tracks the buffered length, so the next call starts there
            assert_eq!(decoder.scanned, decoder.buffer_len());
        }

        decoder.extend(&data[data.len() - 1..]);
        let frame = decoder.decode_next().expect("decode error").expect("frame");
        assert_eq!(frame.len(), data.len());

        // The cursor does not leak into the next frame
        decoder.extend(&jpeg(b"next"));
        let next = decoder.decode_next().expect("decode error").expect("frame");
        assert_eq!(&next[..], &jpeg(b"next")[..]);
    }
}
