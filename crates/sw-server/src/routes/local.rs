//! Local audio routes.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;

use crate::context::AppContext;
use crate::error::ApiResult;

fn range(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::RANGE).and_then(|v| v.to_str().ok())
}

/// GET /stream
pub async fn stream_default(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let track = &ctx.config.server.default_track;
    Ok(ctx.local.open(track, range(&headers)).await?)
}

/// GET /stream/{filename}
pub async fn stream_file(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    Ok(ctx.local.open(&filename, range(&headers)).await?)
}

/// GET /mp3-list
pub async fn mp3_list(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(ctx.local.list_mp3().await?))
}
