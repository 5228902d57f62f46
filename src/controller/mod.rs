//! Motion controller boundary
//!
//! The rover's motion controller accepts one direction per request and
//! answers with a status code. The trait keeps the dispatcher independent of
//! how the request travels.

mod http;
mod traits;

pub use http::HttpController;
pub use traits::MotionController;
