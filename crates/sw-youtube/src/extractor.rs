//! Extraction capability: turning a source URL into candidate media tracks.
//!
//! The production backend shells out to `yt-dlp -J` and parses its JSON
//! description of the video. Failures are classified into
//! [`Error::Unavailable`] (restricted, removed, private) and
//! [`Error::ExtractionFailed`] (everything else).

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use sw_core::{Error, Result};
use tokio::process::Command;

const YTDLP: &str = "yt-dlp";

/// Lower-cased stderr fragments that mean the source itself is off-limits.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "not available in your country",
    "geo restrict",
    "geo-restrict",
    "video unavailable",
    "this video is unavailable",
    "private video",
    "has been removed",
    "account associated with this video has been terminated",
    "sign in to confirm your age",
    "members-only",
    "join this channel",
    "copyright",
    "http error 403",
    "403: forbidden",
];

// ---------------------------------------------------------------------------
// Extraction result
// ---------------------------------------------------------------------------

/// Description of a remote media item as reported by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedMedia {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Single direct URL, present when the extractor already picked a format.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Vec<MediaFormat>,
}

/// One candidate track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
}

impl MediaFormat {
    /// Carries an audio codec.
    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// Carries audio and no video.
    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && self.vcodec.as_deref() == Some("none")
    }
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

// ---------------------------------------------------------------------------
// Extractor trait
// ---------------------------------------------------------------------------

/// Third-party capability that lists the tracks behind a source URL.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short identifier used in logs (e.g. `"yt-dlp"`).
    fn name(&self) -> &'static str;

    /// Describe the media at `source_url`.
    async fn extract(&self, source_url: &str) -> Result<ExtractedMedia>;
}

// ---------------------------------------------------------------------------
// yt-dlp backend
// ---------------------------------------------------------------------------

/// Information about the extractor binary.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// [`Extractor`] backed by the `yt-dlp` command-line tool.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary: PathBuf,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Prefer an existing configured path, then a `PATH` lookup.
    ///
    /// When neither finds the binary the bare name is kept so that each
    /// extraction reports the problem instead of failing at startup.
    pub fn discover(configured: Option<&Path>) -> Self {
        if let Some(path) = configured {
            if path.exists() {
                return Self::new(path);
            }
            tracing::warn!("Configured yt-dlp path {} does not exist", path.display());
        }

        match which::which(YTDLP) {
            Ok(path) => Self::new(path),
            Err(_) => {
                tracing::warn!("yt-dlp not found on PATH; audio extraction will fail");
                Self::new(YTDLP)
            }
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run `yt-dlp --version` and report what was found.
    pub async fn tool_info(&self) -> ToolInfo {
        let output = Command::new(&self.binary)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => ToolInfo {
                name: YTDLP.to_string(),
                available: true,
                version: String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .map(|s| s.trim().to_string()),
                path: which::which(&self.binary).ok(),
            },
            _ => ToolInfo {
                name: YTDLP.to_string(),
                available: false,
                version: None,
                path: None,
            },
        }
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        YTDLP
    }

    async fn extract(&self, source_url: &str) -> Result<ExtractedMedia> {
        tracing::debug!(url = %source_url, "Running yt-dlp");

        let output = Command::new(&self.binary)
            .args([
                "-J",
                "--no-playlist",
                "--no-warnings",
                "-f",
                "bestaudio/best",
                "--",
            ])
            .arg(source_url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::ExtractionFailed(format!(
                        "{} not found",
                        self.binary.display()
                    ))
                } else {
                    Error::ExtractionFailed(format!("failed to run yt-dlp: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        parse_output(&output.stdout)
    }
}

/// Parse the `-J` JSON document.
pub fn parse_output(stdout: &[u8]) -> Result<ExtractedMedia> {
    serde_json::from_slice(stdout)
        .map_err(|e| Error::ExtractionFailed(format!("invalid yt-dlp output: {e}")))
}

/// Map yt-dlp's stderr onto the error taxonomy.
pub fn classify_failure(stderr: &str) -> Error {
    let message = stderr
        .lines()
        .rev()
        .find(|l| l.contains("ERROR"))
        .or_else(|| stderr.lines().rev().find(|l| !l.trim().is_empty()))
        .unwrap_or("yt-dlp exited with an error")
        .trim()
        .to_string();

    let lowered = stderr.to_lowercase();
    if UNAVAILABLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        Error::Unavailable(message)
    } else {
        Error::ExtractionFailed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_geo_restriction_as_unavailable() {
        let stderr = "ERROR: [youtube] abc123: The uploader has not made this video \
                      available in your country\nERROR: Video not available in your country";
        assert!(matches!(classify_failure(stderr), Error::Unavailable(_)));
    }

    #[test]
    fn classify_removed_and_private_as_unavailable() {
        for stderr in [
            "ERROR: [youtube] x: Video unavailable. This video has been removed by the uploader",
            "ERROR: [youtube] x: Private video. Sign in if you've been granted access",
            "ERROR: unable to download video data: HTTP Error 403: Forbidden",
        ] {
            assert!(
                matches!(classify_failure(stderr), Error::Unavailable(_)),
                "expected unavailable for {stderr}"
            );
        }
    }

    #[test]
    fn classify_other_failures_as_extraction_failed() {
        let err = classify_failure("ERROR: Unable to download webpage: timed out");
        match err {
            Error::ExtractionFailed(msg) => assert!(msg.contains("timed out")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn classify_empty_stderr() {
        let err = classify_failure("");
        assert!(matches!(err, Error::ExtractionFailed(ref m) if m.contains("exited")));
    }

    #[test]
    fn parse_minimal_output() {
        let json = br#"{
            "id": "abc123",
            "title": "Song A",
            "duration": 180.4,
            "formats": [
                {"format_id": "140", "url": "https://cdn.example/a.m4a", "acodec": "mp4a.40.2", "vcodec": "none", "ext": "m4a"},
                {"format_id": "18", "url": "https://cdn.example/v.mp4", "acodec": "mp4a.40.2", "vcodec": "avc1", "ext": "mp4"}
            ]
        }"#;
        let media = parse_output(json).unwrap();
        assert_eq!(media.title.as_deref(), Some("Song A"));
        assert_eq!(media.formats.len(), 2);
        assert!(media.formats[0].is_audio_only());
        assert!(!media.formats[1].is_audio_only());
        assert!(media.formats[1].has_audio());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_output(b"not json"),
            Err(Error::ExtractionFailed(_))
        ));
    }

    #[test]
    fn missing_or_none_codec_has_no_audio() {
        let f = MediaFormat {
            acodec: Some("none".into()),
            vcodec: Some("vp9".into()),
            ..Default::default()
        };
        assert!(!f.has_audio());
        assert!(!MediaFormat::default().has_audio());
    }

    #[tokio::test]
    async fn missing_binary_is_extraction_failure() {
        let extractor = YtDlpExtractor::new("/nonexistent/yt-dlp-12345");
        let err = extractor
            .extract("https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(ref m) if m.contains("not found")));
    }

    #[tokio::test]
    async fn tool_info_for_missing_binary() {
        let info = YtDlpExtractor::new("/nonexistent/yt-dlp-12345").tool_info().await;
        assert!(!info.available);
        assert!(info.version.is_none());
    }
}
