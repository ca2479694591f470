//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and static file serving.

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::routes;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let youtube_routes = Router::new()
        .route(
            "/youtube/search",
            get(routes::youtube::search).options(routes::youtube::preflight),
        )
        .route(
            "/youtube/video/{id}",
            get(routes::youtube::video).options(routes::youtube::preflight),
        )
        .route(
            "/youtube/audio/{id}",
            get(routes::youtube::audio).options(routes::youtube::preflight),
        )
        .route(
            "/youtube/stream/{id}",
            get(routes::youtube::stream).options(routes::youtube::preflight),
        );

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Local files
        .route("/stream", get(routes::local::stream_default))
        .route("/stream/{filename}", get(routes::local::stream_file))
        .route("/mp3-list", get(routes::local::mp3_list))
        .route("/playlists", get(routes::playlists::list_playlists))
        // Playback control
        .route("/ws", get(routes::control::control_ws))
        .merge(youtube_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // SPA fallback: serve index.html for any route that doesn't match a file.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {}", dir.display());
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}
