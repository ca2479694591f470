//! YouTube routes: search, video info, audio resolution, and the relay.
//!
//! Search and video info need the Data API key; resolution and streaming
//! go through the extractor and work without it.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sw_youtube::{VideoDetails, VideoSummary};

use crate::context::AppContext;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub success: bool,
    pub audio_url: String,
    pub title: String,
    pub duration: Option<u64>,
    pub cached: bool,
}

/// GET /youtube/search?q=&max_results=
pub async fn search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<VideoSummary>>> {
    let catalog = ctx.catalog()?;
    Ok(Json(catalog.search(&params.q, params.max_results).await?))
}

/// GET /youtube/video/{id}
pub async fn video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<VideoDetails>> {
    let catalog = ctx.catalog()?;
    Ok(Json(catalog.video(&id).await?))
}

/// GET /youtube/audio/{id}
pub async fn audio(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<AudioResponse>> {
    let resolution = ctx.resolver.resolve(&id).await?;
    Ok(Json(AudioResponse {
        success: true,
        audio_url: resolution.audio.url,
        title: resolution.audio.title,
        duration: resolution.audio.duration,
        cached: resolution.cached,
    }))
}

/// GET /youtube/stream/{id}
pub async fn stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let resolution = ctx.resolver.resolve(&id).await?;
    tracing::debug!(video_id = %id, cached = resolution.cached, "Streaming YouTube audio");
    Ok(ctx
        .relay
        .stream(&resolution.audio.url, headers.get(header::RANGE))
        .await?)
}

/// OPTIONS on the YouTube routes.
pub async fn preflight() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
