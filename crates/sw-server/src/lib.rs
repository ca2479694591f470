//! sw-server: HTTP API server for the synchronized audio player.
//!
//! This crate ties the sw-* crates together into a running server:
//!
//! - Local file streaming and the YouTube relay
//! - YouTube search, video info, and audio resolution endpoints
//! - WebSocket playback-control fan-out
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod router;
pub mod routes;
pub mod streaming;

use std::net::SocketAddr;
use std::sync::Arc;

use sw_core::config::Config;
use sw_youtube::YtDlpExtractor;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the syncwave server.
///
/// Builds the [`AppContext`] with the yt-dlp extractor, binds the configured
/// address, and serves until a shutdown signal arrives.
pub async fn start(config: Config) -> sw_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let extractor = YtDlpExtractor::discover(config.youtube.ytdlp_path.as_deref());
    let info = extractor.tool_info().await;
    if info.available {
        tracing::info!(
            "Tool found: {} ({})",
            info.name,
            info.version.as_deref().unwrap_or("unknown version")
        );
    } else {
        tracing::warn!("Tool not found: {}", info.name);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| sw_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, Arc::new(extractor))?;
    if ctx.catalog.is_none() {
        tracing::warn!("YouTube search disabled: no API key configured");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| sw_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Starting server on {addr}");

    serve(listener, ctx, CancellationToken::new()).await
}

/// Serve `ctx` on an already-bound listener until a signal or `cancel` fires.
pub async fn serve(
    listener: tokio::net::TcpListener,
    ctx: AppContext,
    cancel: CancellationToken,
) -> sw_core::Result<()> {
    let static_dir = ctx.config.server.static_dir.clone();
    let app = router::build_router(ctx, static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM) or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
