//! Range-aware file streaming for audio delivery.
//!
//! Serves a file, or a byte sub-range of it, as an HTTP response with a
//! lazily-consumed body. The file size is read once up front; disk reads
//! happen chunk by chunk as the transport drains the body, so a client
//! that disconnects mid-stream drops the file handle with it.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{Stream, stream};
use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::content_type::DEFAULT_CONTENT_TYPE;

/// Size of chunks read from disk per body poll.
const CHUNK_SIZE: u64 = 64 * 1024; // 64 KiB

/// Responses are privately cacheable for an hour.
const CACHE_CONTROL: &str = "private, max-age=3600";

/// Single-range grammar. Multi-range headers are not supported; the first
/// `start-end` pair wins and the rest of the header is ignored.
static RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^bytes=(\d+)-(\d+)?").expect("range pattern is valid"));

/// Inclusive byte window into a file of known total size.
///
/// Invariant: `start <= end`. [`parse_range_header`] rejects headers
/// that would violate this, so `len` cannot underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the window.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// The file could not be stat'd: nonexistent, permission denied, or any
/// other metadata failure. Callers translate this into a 404.
#[derive(Debug, thiserror::Error)]
#[error("file unavailable: {path}")]
pub struct FileUnavailable {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Parses an HTTP `Range` header value against a known file size.
///
/// Returns `None` for a malformed header, which callers treat the same
/// as an absent header (full-content response, never an error). An
/// omitted end means "through end of file". A header that is present but
/// covers the whole file (`bytes=0-`) still yields a range, so the
/// response stays 206 rather than degrading to 200.
///
/// Out-of-bounds ranges are passed through as requested; no clamping or
/// 416 is produced here. A reversed window (`end` before `start`) would
/// break the `start <= end` invariant, so it is rejected as malformed
/// like any other unparseable header.
pub fn parse_range_header(value: &str, file_size: u64) -> Option<ByteRange> {
    let captures = RANGE_PATTERN.captures(value)?;
    let start = captures.get(1)?.as_str().parse::<u64>().ok()?;
    let end = match captures.get(2) {
        Some(end) => end.as_str().parse::<u64>().ok()?,
        None => file_size.saturating_sub(1),
    };
    if end < start {
        return None;
    }
    Some(ByteRange { start, end })
}

/// Serves a file as an HTTP response, honoring an optional `Range` header.
///
/// Returns 200 with the whole file when no valid range is present, 206
/// with the requested window otherwise. The body is a lazy chunked
/// stream; only the stat happens before this function returns.
///
/// # Errors
/// - `FileUnavailable` - The file cannot be stat'd; map to a 404
pub async fn stream_file(
    path: &Path,
    range_header: Option<&str>,
    content_type: Option<&str>,
) -> Result<Response, FileUnavailable> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| FileUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    let file_size = metadata.len();
    let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);

    let range = range_header.and_then(|value| {
        let range = parse_range_header(value, file_size);
        if range.is_none() {
            tracing::debug!("Ignoring malformed Range header: {value:?}");
        }
        range
    });

    let response = match range {
        Some(range) => {
            let body = Body::from_stream(file_chunks(path.to_path_buf(), range.start, range.len()));
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, range.len().to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", range.start, range.end, file_size),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CACHE_CONTROL, CACHE_CONTROL)
                .body(body)
        }
        None => {
            let body = Body::from_stream(file_chunks(path.to_path_buf(), 0, file_size));
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CACHE_CONTROL, CACHE_CONTROL)
                .body(body)
        }
    };

    Ok(response.unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

struct ChunkState {
    path: PathBuf,
    file: Option<File>,
    start: u64,
    remaining: u64,
}

/// Lazy chunked reader over `[start, start + length)`.
///
/// The file is opened and seeked on first poll. A read past end of file
/// simply ends the stream, so an out-of-bounds range yields a short body.
fn file_chunks(
    path: PathBuf,
    start: u64,
    length: u64,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    stream::try_unfold(
        ChunkState {
            path,
            file: None,
            start,
            remaining: length,
        },
        |mut state| async move {
            if state.remaining == 0 {
                return Ok(None);
            }

            let mut file = match state.file.take() {
                Some(file) => file,
                None => {
                    let mut file = File::open(&state.path).await?;
                    file.seek(SeekFrom::Start(state.start)).await?;
                    file
                }
            };

            let chunk_size = state.remaining.min(CHUNK_SIZE) as usize;
            let mut buffer = vec![0u8; chunk_size];
            let bytes_read = file.read(&mut buffer).await?;
            if bytes_read == 0 {
                return Ok(None); // EOF before the requested range was exhausted
            }
            buffer.truncate(bytes_read);

            state.remaining -= bytes_read as u64;
            state.file = Some(file);
            Ok(Some((Bytes::from(buffer), state)))
        },
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn temp_audio_file(name: &str, data: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        tokio::fs::write(&path, data).await.unwrap();
        (dir, path)
    }

    fn header<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_parse_range_header_closed() {
        let range = parse_range_header("bytes=100-199", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 100, end: 199 });
        assert_eq!(range.len(), 100);
    }

    #[test]
    fn test_parse_range_header_open_ended() {
        let range = parse_range_header("bytes=500-", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 500, end: 999 });
    }

    #[test]
    fn test_parse_range_header_whole_file_is_still_a_range() {
        let range = parse_range_header("bytes=0-", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 999 });
    }

    #[test]
    fn test_parse_range_header_malformed() {
        assert!(parse_range_header("invalid-range", 1000).is_none());
        assert!(parse_range_header("bytes=abc", 1000).is_none());
        assert!(parse_range_header("", 1000).is_none());
    }

    #[test]
    fn test_parse_range_header_reversed_window_is_malformed() {
        assert!(parse_range_header("bytes=5-3", 1000).is_none());
        // Open-ended range starting past EOF resolves to a reversed
        // window and is rejected the same way.
        assert!(parse_range_header("bytes=2000-", 1000).is_none());
    }

    #[test]
    fn test_parse_range_header_single_byte_window() {
        let range = parse_range_header("bytes=0-0", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 0 });
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_parse_range_header_requires_bytes_prefix_at_start() {
        assert!(parse_range_header("xxbytes=10-20", 1000).is_none());
    }

    #[test]
    fn test_parse_range_header_multi_range_uses_first_pair() {
        let range = parse_range_header("bytes=0-99,200-299", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 99 });
    }

    #[test]
    fn test_parse_range_header_out_of_bounds_passes_through() {
        let range = parse_range_header("bytes=50-199", 100).unwrap();
        assert_eq!(range, ByteRange { start: 50, end: 199 });
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable_for_any_range() {
        let path = Path::new("/no/such/session.ogg");
        for range in [None, Some("bytes=0-"), Some("bytes=10-20"), Some("garbage")] {
            let result = stream_file(path, range, None).await;
            assert!(result.is_err(), "range {range:?} should not mask the stat failure");
        }
    }

    #[tokio::test]
    async fn test_full_content_response() {
        let data: Vec<u8> = (0..100).map(|i| i as u8).collect();
        let (_dir, path) = temp_audio_file("calm.ogg", &data).await;

        let response = stream_file(&path, None, None).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, header::CONTENT_TYPE), Some("audio/ogg"));
        assert_eq!(header(&response, header::CONTENT_LENGTH), Some("100"));
        assert_eq!(header(&response, header::ACCEPT_RANGES), Some("bytes"));
        assert_eq!(
            header(&response, header::CACHE_CONTROL),
            Some("private, max-age=3600")
        );
        assert!(response.headers().get(header::CONTENT_RANGE).is_none());

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body.as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_open_ended_range_from_zero_is_partial_content() {
        let (_dir, path) = temp_audio_file("calm.ogg", &[1u8; 5000]).await;

        let response = stream_file(&path, Some("bytes=0-"), None).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_LENGTH), Some("5000"));
        assert_eq!(
            header(&response, header::CONTENT_RANGE),
            Some("bytes 0-4999/5000")
        );
    }

    #[tokio::test]
    async fn test_leading_range_window() {
        let (_dir, path) = temp_audio_file("calm.ogg", &[7u8; 5000]).await;

        let response = stream_file(&path, Some("bytes=0-1023"), None).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_LENGTH), Some("1024"));
        assert_eq!(
            header(&response, header::CONTENT_RANGE),
            Some("bytes 0-1023/5000")
        );

        let body = to_bytes(response.into_body(), 8192).await.unwrap();
        assert_eq!(body.len(), 1024);
    }

    #[tokio::test]
    async fn test_interior_range_window() {
        let data: Vec<u8> = (0..10000u32).map(|i| (i % 251) as u8).collect();
        let (_dir, path) = temp_audio_file("session.m4a", &data).await;

        let response = stream_file(&path, Some("bytes=1000-2000"), Some("audio/mp4"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_TYPE), Some("audio/mp4"));
        assert_eq!(header(&response, header::CONTENT_LENGTH), Some("1001"));
        assert_eq!(
            header(&response, header::CONTENT_RANGE),
            Some("bytes 1000-2000/10000")
        );

        let body = to_bytes(response.into_body(), 16384).await.unwrap();
        assert_eq!(body.as_ref(), &data[1000..=2000]);
    }

    #[tokio::test]
    async fn test_malformed_range_is_served_as_full_content() {
        let (_dir, path) = temp_audio_file("calm.ogg", &[0u8; 100]).await;

        let plain = stream_file(&path, None, None).await.unwrap();
        for malformed in ["invalid-range", "bytes=abc", "items=0-10"] {
            let response = stream_file(&path, Some(malformed), None).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "header {malformed:?}");
            assert_eq!(response.headers(), plain.headers(), "header {malformed:?}");
        }
    }

    #[tokio::test]
    async fn test_reversed_range_is_served_as_full_content() {
        let (_dir, path) = temp_audio_file("calm.ogg", &[0u8; 100]).await;

        let plain = stream_file(&path, None, None).await.unwrap();
        let response = stream_file(&path, Some("bytes=5-3"), None).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers(), plain.headers());
    }

    #[tokio::test]
    async fn test_single_byte_range_window() {
        let (_dir, path) = temp_audio_file("calm.ogg", &[4u8; 100]).await;

        let response = stream_file(&path, Some("bytes=0-0"), None).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_LENGTH), Some("1"));
        assert_eq!(
            header(&response, header::CONTENT_RANGE),
            Some("bytes 0-0/100")
        );

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body.as_ref(), &[4u8]);
    }

    #[tokio::test]
    async fn test_out_of_bounds_range_streams_short_body() {
        // No 416 is produced; the range is framed as requested and the
        // body ends at EOF.
        let (_dir, path) = temp_audio_file("calm.ogg", &[3u8; 100]).await;

        let response = stream_file(&path, Some("bytes=50-199"), None).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_LENGTH), Some("150"));
        assert_eq!(
            header(&response, header::CONTENT_RANGE),
            Some("bytes 50-199/100")
        );

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body.len(), 50);
    }

    #[tokio::test]
    async fn test_identical_requests_produce_identical_headers() {
        let (_dir, path) = temp_audio_file("calm.ogg", &[9u8; 2048]).await;

        let first = stream_file(&path, Some("bytes=100-299"), Some("audio/mpeg"))
            .await
            .unwrap();
        let second = stream_file(&path, Some("bytes=100-299"), Some("audio/mpeg"))
            .await
            .unwrap();

        assert_eq!(first.status(), second.status());
        assert_eq!(first.headers(), second.headers());
    }
}
