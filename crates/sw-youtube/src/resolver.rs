//! Audio resolution with caching and request coalescing.
//!
//! [`AudioResolver::resolve`] answers from the [`ResolutionCache`] when it
//! can. On a miss, concurrent callers asking for the same identifier share a
//! single pending extraction: the first caller starts it, later callers wait
//! on the same shared future, and everyone observes the same outcome.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::sync::Arc;
use sw_core::{Error, Result};

use crate::cache::{cache_key, CacheEntry, ResolutionCache};
use crate::extractor::{ExtractedMedia, Extractor};
use crate::formats::select_audio_url;

type SharedResult = std::result::Result<ResolvedAudio, Arc<Error>>;
type InFlight = Shared<BoxFuture<'static, SharedResult>>;

/// A playable audio source for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAudio {
    pub url: String,
    pub title: String,
    /// Whole seconds, when the extractor reported a length.
    pub duration: Option<u64>,
}

impl From<CacheEntry> for ResolvedAudio {
    fn from(entry: CacheEntry) -> Self {
        Self {
            url: entry.media_url,
            title: entry.title,
            duration: entry.duration_secs,
        }
    }
}

/// Outcome of [`AudioResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub audio: ResolvedAudio,
    /// Served from the cache without calling the extractor.
    pub cached: bool,
}

/// Resolves identifiers to direct audio URLs.
pub struct AudioResolver {
    extractor: Arc<dyn Extractor>,
    cache: Arc<ResolutionCache>,
    watch_base_url: String,
    in_flight: Arc<DashMap<String, InFlight>>,
}

impl AudioResolver {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        cache: Arc<ResolutionCache>,
        watch_base_url: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            cache,
            watch_base_url: watch_base_url.into(),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Canonical source URL handed to the extractor.
    pub fn source_url(&self, video_id: &str) -> String {
        format!("{}{}", self.watch_base_url, video_id)
    }

    /// Resolve `video_id` to a playable audio URL.
    pub async fn resolve(&self, video_id: &str) -> Result<Resolution> {
        validate_video_id(video_id)?;
        let key = cache_key(video_id);

        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!(video_id, "Resolution cache hit");
            return Ok(Resolution {
                audio: entry.into(),
                cached: true,
            });
        }

        let pending = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!(video_id, "Joining in-flight resolution");
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                let pending = self.start(key, video_id);
                slot.insert(pending.clone());
                pending
            }
        };

        pending
            .await
            .map(|audio| Resolution {
                audio,
                cached: false,
            })
            .map_err(|e| Error::from_shared(&e))
    }

    /// Spawn the extraction so it completes even if every caller goes away.
    fn start(&self, key: String, video_id: &str) -> InFlight {
        let extractor = Arc::clone(&self.extractor);
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        let source_url = self.source_url(video_id);
        let video_id = video_id.to_string();
        let marker = (Arc::clone(&self.in_flight), key.clone());

        let task = tokio::spawn(async move {
            tracing::info!(video_id = %video_id, extractor = extractor.name(), "Resolving audio");
            let outcome = extract_audio(extractor.as_ref(), &source_url).await;

            match &outcome {
                Ok(audio) => {
                    cache.put(key.as_str(), audio.url.clone(), audio.title.clone(), audio.duration);
                    cache.evict_expired();
                }
                Err(e) => tracing::warn!(video_id = %video_id, "Resolution failed: {e}"),
            }

            in_flight.remove(&key);
            outcome.map_err(Arc::new)
        });

        async move {
            task.await.unwrap_or_else(|e| {
                // The task never reached its own cleanup.
                let (in_flight, key) = marker;
                in_flight.remove(&key);
                tracing::error!(key = %key, "Resolution task failed: {e}");
                Err(Arc::new(Error::Internal(format!(
                    "resolution task failed: {e}"
                ))))
            })
        }
        .boxed()
        .shared()
    }
}

async fn extract_audio(extractor: &dyn Extractor, source_url: &str) -> Result<ResolvedAudio> {
    let media = extractor.extract(source_url).await?;
    let url = select_audio_url(&media)?;
    Ok(ResolvedAudio {
        url,
        title: display_title(&media),
        duration: whole_seconds(media.duration),
    })
}

fn display_title(media: &ExtractedMedia) -> String {
    media
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn whole_seconds(duration: Option<f64>) -> Option<u64> {
    duration
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| d.round() as u64)
}

/// Identifiers are non-empty and limited to `[A-Za-z0-9_-]`.
pub fn validate_video_id(video_id: &str) -> Result<()> {
    if video_id.is_empty() {
        return Err(Error::Validation("video id must not be empty".into()));
    }
    if !video_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Validation(format!("invalid video id: {video_id}")));
    }
    Ok(())
}
