//! Application context shared by all route handlers.
//!
//! [`AppContext`] is built once at startup and handed to Axum as state. The
//! resolution cache, control hub, and HTTP clients live behind `Arc`s so
//! cloning the context per request is cheap.

use std::sync::Arc;

use sw_core::config::Config;
use sw_core::control::ControlHub;
use sw_core::{Clock, Error, Result, SystemClock};
use sw_youtube::{AudioResolver, Extractor, ResolutionCache, YoutubeCatalog};

use crate::streaming::{LocalStreamer, RelayProxy};

/// Central application context, cloned into every handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub resolver: Arc<AudioResolver>,
    /// `None` when no API key is configured.
    pub catalog: Option<Arc<YoutubeCatalog>>,
    pub relay: Arc<RelayProxy>,
    pub local: Arc<LocalStreamer>,
    pub control: Arc<ControlHub>,
}

impl AppContext {
    /// Build the context on the system clock.
    pub fn new(config: Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
        Self::with_clock(config, extractor, Arc::new(SystemClock))
    }

    /// Build the context with an explicit clock for cache expiry.
    pub fn with_clock(
        config: Config,
        extractor: Arc<dyn Extractor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let cache = Arc::new(ResolutionCache::new(config.youtube.cache_ttl(), clock));
        let resolver = Arc::new(AudioResolver::new(
            extractor,
            cache,
            config.youtube.watch_base_url.clone(),
        ));

        let catalog = match config.youtube.api_key() {
            Some(key) => Some(Arc::new(YoutubeCatalog::new(
                key,
                config.youtube.api_base_url.clone(),
            )?)),
            None => None,
        };

        Ok(Self {
            relay: Arc::new(RelayProxy::new(config.relay.clone())?),
            local: Arc::new(LocalStreamer::new(config.server.media_dir.clone())),
            control: Arc::new(ControlHub::new()),
            catalog,
            resolver,
            config: Arc::new(config),
        })
    }

    /// The search capability, or [`Error::ConfigurationMissing`].
    pub fn catalog(&self) -> Result<&YoutubeCatalog> {
        self.catalog.as_deref().ok_or_else(|| {
            Error::ConfigurationMissing(format!(
                "YouTube API key not configured; set {}",
                sw_core::config::API_KEY_ENV
            ))
        })
    }
}
