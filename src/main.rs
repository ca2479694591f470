mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use sw_core::config::Config;
use sw_youtube::{AudioResolver, ResolutionCache, YtDlpExtractor};

/// Load config from file (or defaults) and overlay the environment.
fn load_config(path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path);

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting syncwave server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    sw_server::start(config).await.context("server failed")
}

async fn resolve(id: &str, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let extractor = YtDlpExtractor::discover(config.youtube.ytdlp_path.as_deref());
    let cache = Arc::new(ResolutionCache::with_ttl(config.youtube.cache_ttl()));
    let resolver = AudioResolver::new(
        Arc::new(extractor),
        cache,
        config.youtube.watch_base_url.clone(),
    );

    let resolution = resolver
        .resolve(id)
        .await
        .with_context(|| format!("failed to resolve {id}"))?;

    let output = serde_json::json!({
        "success": true,
        "audio_url": resolution.audio.url,
        "title": resolution.audio.title,
        "duration": resolution.audio.duration,
        "cached": resolution.cached,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = load_config(config_path);
    let extractor = YtDlpExtractor::discover(config.youtube.ytdlp_path.as_deref());
    let tool = extractor.tool_info().await;

    let status = if tool.available { "✓" } else { "✗" };
    print!("{} {}", status, tool.name);
    if let Some(ref version) = tool.version {
        print!(" ({version})");
    }
    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if tool.available {
        println!("All required tools are available!");
    } else {
        println!("yt-dlp is missing. Install it to enable YouTube audio.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let mut config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let config = Config::load(p)
                .with_context(|| format!("invalid config file {}", p.display()))?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };
    config.apply_env();

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Media dir: {}", config.server.media_dir.display());
    println!(
        "  YouTube search: {}",
        if config.youtube.api_key().is_some() { "enabled" } else { "disabled" }
    );
    println!("  Resolution cache TTL: {}s", config.youtube.cache_ttl_secs);
    println!("  Playlists: {}", config.playlists.len());

    for warning in config.validate() {
        println!("  ! {warning}");
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "syncwave=trace,sw_server=trace,sw_youtube=trace,sw_core=debug,tower_http=debug".to_string()
        } else {
            "syncwave=debug,sw_server=debug,sw_youtube=info,sw_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, config_path))
        }
        Commands::Resolve { id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve(&id, config_path))
        }
        Commands::CheckTools => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check_tools(config_path))
        }
        Commands::Validate { config } => {
            let path = config.or(cli.config.clone());
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("syncwave {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
