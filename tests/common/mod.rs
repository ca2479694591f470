//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a full [`AppContext`] around a
//! scripted [`FakeExtractor`] and a [`ManualClock`], writes a small media
//! directory, and runs the server on a random port until `shutdown` fires.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sw_core::config::Config;
use sw_core::{Error, ManualClock, Result};
use sw_server::context::AppContext;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use sw_youtube::{ExtractedMedia, Extractor, MediaFormat};

/// Name and size of the default track written into every media directory.
pub const DEFAULT_TRACK: &str = "Armadham.mp3";
pub const DEFAULT_TRACK_LEN: usize = 4096;

/// Deterministic file contents so range slices can be checked.
pub fn track_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// ---------------------------------------------------------------------------
// Fake extractor
// ---------------------------------------------------------------------------

enum Scripted {
    Audio(ExtractedMedia),
    Unavailable(String),
}

/// Extractor that answers from a fixed table and counts its calls.
pub struct FakeExtractor {
    calls: AtomicUsize,
    delay: Duration,
    table: HashMap<String, Scripted>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            table: HashMap::new(),
        }
    }

    /// Answer `id` with a single audio-only track.
    pub fn with_audio(mut self, id: &str, url: &str, title: &str, duration: f64) -> Self {
        let media = ExtractedMedia {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            duration: Some(duration),
            url: None,
            formats: vec![MediaFormat {
                format_id: Some("140".into()),
                url: Some(url.to_string()),
                acodec: Some("mp4a.40.2".into()),
                vcodec: Some("none".into()),
                ext: Some("m4a".into()),
            }],
        };
        self.table.insert(id.to_string(), Scripted::Audio(media));
        self
    }

    /// Report `id` as restricted.
    pub fn with_unavailable(mut self, id: &str, message: &str) -> Self {
        self.table
            .insert(id.to_string(), Scripted::Unavailable(message.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract(&self, source_url: &str) -> Result<ExtractedMedia> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let id = source_url.rsplit("v=").next().unwrap_or_default();
        match self.table.get(id) {
            Some(Scripted::Audio(media)) => Ok(media.clone()),
            Some(Scripted::Unavailable(msg)) => Err(Error::Unavailable(msg.clone())),
            None => Err(Error::ExtractionFailed(format!("no formats for {source_url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A running server with its context and test doubles.
pub struct TestHarness {
    pub ctx: AppContext,
    pub addr: SocketAddr,
    pub extractor: Arc<FakeExtractor>,
    pub clock: Arc<ManualClock>,
    pub media_dir: tempfile::TempDir,
    pub shutdown: CancellationToken,
    pub server: JoinHandle<Result<()>>,
}

impl TestHarness {
    /// Start a server with default configuration.
    pub async fn start(extractor: FakeExtractor) -> Self {
        Self::start_with(extractor, |_| {}).await
    }

    /// Start a server after letting the caller adjust the configuration.
    pub async fn start_with(extractor: FakeExtractor, configure: impl FnOnce(&mut Config)) -> Self {
        let media_dir = tempfile::tempdir().expect("failed to create media dir");
        std::fs::write(
            media_dir.path().join(DEFAULT_TRACK),
            track_bytes(DEFAULT_TRACK_LEN),
        )
        .expect("failed to write default track");
        std::fs::write(media_dir.path().join("second.mp3"), b"second track")
            .expect("failed to write second track");

        let mut config = Config::default();
        config.server.static_dir = None;
        config.server.media_dir = media_dir.path().to_path_buf();
        config.server.default_track = DEFAULT_TRACK.to_string();
        configure(&mut config);

        let extractor = Arc::new(extractor);
        let clock = Arc::new(ManualClock::new());
        let ctx = AppContext::with_clock(config, extractor.clone(), clock.clone())
            .expect("failed to build context");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        let shutdown = CancellationToken::new();
        let server = tokio::spawn(sw_server::serve(listener, ctx.clone(), shutdown.clone()));

        Self {
            ctx,
            addr,
            extractor,
            clock,
            media_dir,
            shutdown,
            server,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(self.url(path)).await.expect("request failed")
    }
}
