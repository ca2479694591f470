//! YouTube Data API v3 client for search and video information.
//!
//! Only these two endpoints need an API key; resolving and streaming audio
//! work without one. No retries: a failed request is reported as
//! [`Error::UpstreamRequestFailed`].

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sw_core::{Error, Result};
use tracing::debug;

/// Default and upper bound for `maxResults`.
pub const DEFAULT_MAX_RESULTS: u32 = 10;
const MAX_RESULTS_LIMIT: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub published: Option<String>,
}

/// Full information for a single video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub published: Option<String>,
    /// ISO 8601 duration as reported by the API (e.g. `PT3M20S`).
    pub duration: Option<String>,
    pub duration_secs: Option<u64>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

impl Thumbnails {
    fn best(&self) -> Option<String> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .next()
            .map(|t| t.url.clone())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the YouTube Data API.
pub struct YoutubeCatalog {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YoutubeCatalog {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Search for videos matching `query`.
    ///
    /// `max_results` defaults to 10 and is clamped to `1..=50`.
    pub async fn search(&self, query: &str, max_results: Option<u32>) -> Result<Vec<VideoSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("search query must not be empty".into()));
        }
        let max = max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_LIMIT)
            .to_string();

        debug!(query, max_results = %max, "YouTube search");
        let body: ListResponse<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", &max),
                ],
            )
            .await?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let s = item.snippet;
                Some(VideoSummary {
                    id,
                    thumbnail: s.thumbnails.best(),
                    title: s.title.unwrap_or_default(),
                    channel: s.channel_title.unwrap_or_default(),
                    description: s.description.unwrap_or_default(),
                    published: s.published_at,
                })
            })
            .collect())
    }

    /// Fetch details for one video; unknown ids are [`Error::NotFound`].
    pub async fn video(&self, video_id: &str) -> Result<VideoDetails> {
        debug!(video_id, "YouTube video lookup");
        let body: ListResponse<VideoItem> = self
            .get(
                "videos",
                &[("part", "snippet,contentDetails,statistics"), ("id", video_id)],
            )
            .await?;

        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("video", video_id))?;

        let duration = item.content_details.and_then(|c| c.duration);
        let (view_count, like_count) = item
            .statistics
            .map(|s| (parse_count(s.view_count), parse_count(s.like_count)))
            .unwrap_or_default();
        let s = item.snippet;

        Ok(VideoDetails {
            id: item.id,
            thumbnail: s.thumbnails.best(),
            title: s.title.unwrap_or_default(),
            channel: s.channel_title.unwrap_or_default(),
            description: s.description.unwrap_or_default(),
            published: s.published_at,
            duration_secs: duration.as_deref().and_then(parse_iso8601_duration),
            duration,
            view_count,
            like_count,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::UpstreamRequestFailed(format!("YouTube API request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(endpoint, status));
        }

        resp.json().await.map_err(|e| {
            Error::UpstreamRequestFailed(format!("invalid YouTube API response: {e}"))
        })
    }
}

fn api_error(endpoint: &str, status: StatusCode) -> Error {
    Error::UpstreamRequestFailed(format!("YouTube API {endpoint} returned {status}"))
}

fn parse_count(value: Option<String>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` or `P1DT30M` into seconds.
///
/// Year and month designators are rejected since their length is ambiguous.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let rest = value.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut total = 0u64;
    let mut parsed_any = false;

    for (part, units) in [(date, &[('W', 604_800), ('D', 86_400)][..])]
        .into_iter()
        .chain(time.map(|t| (t, &[('H', 3600), ('M', 60), ('S', 1)][..])))
    {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let (_, scale) = units.iter().find(|(u, _)| *u == c)?;
            let amount: f64 = number.parse().ok()?;
            total = total.checked_add((amount * *scale as f64).round() as u64)?;
            number.clear();
            parsed_any = true;
        }
        if !number.is_empty() {
            return None;
        }
    }

    parsed_any.then_some(total)
}
