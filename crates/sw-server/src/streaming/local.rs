//! Local File Streamer.
//!
//! Serves audio files from the configured media directory. The file is opened
//! and measured before any header is sent, so a missing file becomes a 404
//! instead of an empty 200. After that the body is read in [`CHUNK_SIZE`]
//! pieces; a read failure mid-stream ends the body and is logged.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use sw_core::{Error, Result};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::{audio_content_type, end_on_error, parse_range_header};

/// Read size for local files.
pub const CHUNK_SIZE: usize = 1024;

/// Streams files out of a single media directory.
#[derive(Debug, Clone)]
pub struct LocalStreamer {
    media_dir: PathBuf,
}

impl LocalStreamer {
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Map a bare file name onto the media directory.
    ///
    /// Names containing path separators or `..` are rejected.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
            || filename.contains('\0')
        {
            return Err(Error::Validation(format!("invalid file name: {filename}")));
        }
        Ok(self.media_dir.join(filename))
    }

    /// Open `filename` and build the streaming response.
    ///
    /// A satisfiable `Range` header yields `206 Partial Content`; anything
    /// else falls back to the whole file.
    pub async fn open(&self, filename: &str, range: Option<&str>) -> Result<Response> {
        let path = self.path_for(filename)?;

        let mut file = File::open(&path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), "Cannot open local file: {e}");
            Error::not_found("file", filename)
        })?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::not_found("file", filename));
        }
        let file_size = metadata.len();
        let content_type = audio_content_type(filename);
        let range = range.and_then(|r| parse_range_header(r, file_size));

        let builder = Response::builder()
            .header(header::CONTENT_TYPE, content_type)
            .header(header::ACCEPT_RANGES, "bytes");

        let (builder, length) = match range {
            Some((start, end)) => {
                file.seek(SeekFrom::Start(start)).await?;
                let builder = builder.status(StatusCode::PARTIAL_CONTENT).header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{file_size}"),
                );
                (builder, end - start + 1)
            }
            None => (builder.status(StatusCode::OK), file_size),
        };

        tracing::debug!(file = filename, length, "Streaming local file");
        let stream = ReaderStream::with_capacity(file.take(length), CHUNK_SIZE);
        let body = Body::from_stream(end_on_error(stream, filename.to_string()));

        builder
            .header(header::CONTENT_LENGTH, length)
            .body(body)
            .map_err(|e| Error::Internal(format!("failed to build response: {e}")))
    }

    /// Names of the `.mp3` files in the media directory, sorted.
    pub async fn list_mp3(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.media_dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_mp3 = Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
            if is_mp3 && entry.file_type().await?.is_file() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    fn media_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(dir.path().join("track.mp3"), &data).unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub.mp3")).unwrap();
        dir
    }

    #[tokio::test]
    async fn streams_whole_file() {
        let dir = media_dir();
        let streamer = LocalStreamer::new(dir.path());

        let response = streamer.open("track.mp3", None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5000");

        let body = body_bytes(response).await;
        assert_eq!(body, std::fs::read(dir.path().join("track.mp3")).unwrap());
    }

    #[tokio::test]
    async fn streams_range() {
        let dir = media_dir();
        let streamer = LocalStreamer::new(dir.path());

        let response = streamer.open("track.mp3", Some("bytes=1000-2999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 1000-2999/5000");

        let body = body_bytes(response).await;
        let full = std::fs::read(dir.path().join("track.mp3")).unwrap();
        assert_eq!(body, &full[1000..3000]);
    }

    #[tokio::test]
    async fn bad_range_serves_full_file() {
        let dir = media_dir();
        let streamer = LocalStreamer::new(dir.path());
        let response = streamer.open("track.mp3", Some("bytes=9000-")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = media_dir();
        let streamer = LocalStreamer::new(dir.path());
        let err = streamer.open("nope.mp3", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = media_dir();
        let streamer = LocalStreamer::new(dir.path());
        let err = streamer.open("sub.mp3", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn traversal_is_rejected() {
        let streamer = LocalStreamer::new("/srv/music");
        for name in ["../etc/passwd", "a/b.mp3", "..", "a\\b.mp3", ""] {
            assert!(matches!(streamer.path_for(name), Err(Error::Validation(_))));
        }
        assert_eq!(
            streamer.path_for("song.mp3").unwrap(),
            PathBuf::from("/srv/music/song.mp3")
        );
    }

    #[tokio::test]
    async fn lists_only_mp3_files() {
        let dir = media_dir();
        let streamer = LocalStreamer::new(dir.path());
        assert_eq!(streamer.list_mp3().await.unwrap(), vec!["b.mp3", "track.mp3"]);
    }
}
