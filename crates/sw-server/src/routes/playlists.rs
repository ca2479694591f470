//! Static playlist listing shown by the player sidebar.

use axum::extract::State;
use axum::Json;
use sw_core::config::PlaylistConfig;

use crate::context::AppContext;

/// GET /playlists
pub async fn list_playlists(State(ctx): State<AppContext>) -> Json<Vec<PlaylistConfig>> {
    Json(ctx.config.playlists.clone())
}
