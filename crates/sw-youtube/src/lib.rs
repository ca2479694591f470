//! sw-youtube: resolving YouTube identifiers to playable audio.
//!
//! - [`extractor`] -- the extraction capability ([`Extractor`] trait and the
//!   yt-dlp backend).
//! - [`formats`] -- fixed-priority audio track selection.
//! - [`cache`] -- time-based [`ResolutionCache`].
//! - [`resolver`] -- [`AudioResolver`], tying the three together with
//!   per-identifier request coalescing.
//! - [`catalog`] -- YouTube Data API client for search and video info.

pub mod cache;
pub mod catalog;
pub mod extractor;
pub mod formats;
pub mod resolver;

pub use cache::{cache_key, CacheEntry, ResolutionCache};
pub use catalog::{VideoDetails, VideoSummary, YoutubeCatalog};
pub use extractor::{ExtractedMedia, Extractor, MediaFormat, YtDlpExtractor};
pub use resolver::{AudioResolver, Resolution, ResolvedAudio};
