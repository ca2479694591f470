//! Byte streaming to HTTP clients.
//!
//! - [`local`] -- files from the media directory, read in 1 KiB chunks.
//! - [`relay`] -- remote media fetched from the resolved upstream URL and
//!   forwarded as it arrives.

pub mod local;
pub mod relay;

pub use local::{LocalStreamer, CHUNK_SIZE};
pub use relay::RelayProxy;

use bytes::Bytes;
use futures::{future, Stream, StreamExt};
use std::fmt::Display;

/// End a byte stream at the first error instead of propagating it.
///
/// Once response headers are committed there is no way to report a failure
/// except by closing the body early, so the error is logged and the stream
/// simply stops.
pub(crate) fn end_on_error<S, E>(
    stream: S,
    source: String,
) -> impl Stream<Item = Result<Bytes, E>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    stream.scan(source, |source, item| {
        future::ready(match item {
            Ok(chunk) => Some(Ok(chunk)),
            Err(e) => {
                tracing::warn!(source = %source, "Stream ended early: {e}");
                None
            }
        })
    })
}

/// Parse an HTTP `Range` header against a known length.
///
/// Supports formats:
/// - bytes=0-499
/// - bytes=500-
/// - bytes=-500 (last 500 bytes)
///
/// Returns an inclusive `(start, end)` pair, or `None` when the header is
/// malformed or unsatisfiable.
pub fn parse_range_header(header: &str, file_size: u64) -> Option<(u64, u64)> {
    if file_size == 0 {
        return None;
    }
    let (start, end) = header.strip_prefix("bytes=")?.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        (true, false) => {
            let suffix_len: u64 = end.parse().ok()?;
            if suffix_len == 0 {
                return None;
            }
            Some((file_size.saturating_sub(suffix_len), file_size - 1))
        }
        (false, true) => {
            let start: u64 = start.parse().ok()?;
            (start < file_size).then_some((start, file_size - 1))
        }
        (false, false) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse::<u64>().ok()?.min(file_size - 1);
            (start < file_size && start <= end).then_some((start, end))
        }
        (true, true) => None,
    }
}

/// Content type for a local audio file, from its extension.
pub fn audio_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "m4a" | "mp4" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "webm" => "audio/webm",
        _ => "audio/mpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_full_bounds() {
        assert_eq!(parse_range_header("bytes=0-499", 1000), Some((0, 499)));
        assert_eq!(parse_range_header("bytes=100-199", 1000), Some((100, 199)));
    }

    #[test]
    fn range_open_end() {
        assert_eq!(parse_range_header("bytes=500-", 1000), Some((500, 999)));
    }

    #[test]
    fn range_suffix() {
        assert_eq!(parse_range_header("bytes=-200", 1000), Some((800, 999)));
        assert_eq!(parse_range_header("bytes=-5000", 1000), Some((0, 999)));
    }

    #[test]
    fn range_end_clamped() {
        assert_eq!(parse_range_header("bytes=900-5000", 1000), Some((900, 999)));
    }

    #[test]
    fn range_unsatisfiable_or_malformed() {
        assert_eq!(parse_range_header("bytes=1000-", 1000), None);
        assert_eq!(parse_range_header("bytes=500-100", 1000), None);
        assert_eq!(parse_range_header("bytes=-", 1000), None);
        assert_eq!(parse_range_header("items=0-1", 1000), None);
        assert_eq!(parse_range_header("bytes=abc-", 1000), None);
        assert_eq!(parse_range_header("bytes=-10", 0), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(audio_content_type("Armadham.mp3"), "audio/mpeg");
        assert_eq!(audio_content_type("song.M4A"), "audio/mp4");
        assert_eq!(audio_content_type("noext"), "audio/mpeg");
    }

    #[tokio::test]
    async fn end_on_error_truncates() {
        let items: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(std::io::Error::other("disk gone")),
            Ok(Bytes::from_static(b"cd")),
        ];
        let out: Vec<_> = end_on_error(futures::stream::iter(items), "test".into())
            .collect()
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), &Bytes::from_static(b"ab"));
    }
}
