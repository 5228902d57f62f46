//! Video Module
//!
//! Delivers camera frames to the display surface. Frames are opaque JPEG
//! images; nothing here decodes or processes pixels.

mod capture;
mod mjpeg;
mod pump;
mod source;

pub use capture::{default_capture_path, save_frame};
pub use mjpeg::MjpegReader;
pub use pump::{DisplaySurface, FramePump, LogDisplay};
pub use source::{Frame, FrameFeed, FrameSource};
