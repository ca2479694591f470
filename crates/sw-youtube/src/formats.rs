//! Audio track selection.
//!
//! Candidates are checked in a fixed priority order:
//!
//! 1. the first audio-only format (`vcodec == "none"` with an audio codec),
//! 2. the first format that carries any audio codec,
//! 3. the top-level URL the extractor already picked.
//!
//! Formats without a URL are never selected.

use sw_core::{Error, Result};

use crate::extractor::{ExtractedMedia, MediaFormat};

/// Pick the direct audio URL out of an extraction result.
pub fn select_audio_url(media: &ExtractedMedia) -> Result<String> {
    let playable = || media.formats.iter().filter(|f| has_url(f));

    playable()
        .find(|f| f.is_audio_only())
        .or_else(|| playable().find(|f| f.has_audio()))
        .and_then(|f| f.url.clone())
        .or_else(|| media.url.clone().filter(|u| !u.is_empty()))
        .ok_or_else(|| Error::ExtractionFailed("no audio track".into()))
}

fn has_url(format: &MediaFormat) -> bool {
    format.url.as_deref().is_some_and(|u| !u.is_empty())
}
