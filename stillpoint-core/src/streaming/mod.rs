//! Range-aware audio file streaming.
//!
//! Implements enough of RFC 7233 (HTTP Range Requests) for audio
//! scrubbing and seeking to work in browser `<audio>` elements.

mod content_type;
mod stream_file;

pub use content_type::{DEFAULT_CONTENT_TYPE, content_type_for_path};
pub use stream_file::{ByteRange, FileUnavailable, parse_range_header, stream_file};
