//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for the server, the YouTube integration, and the relay proxy.
//! Every section defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

/// Environment variable holding the YouTube Data API key.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Value written by the setup template; treated as "not configured".
const API_KEY_PLACEHOLDER: &str = "your_youtube_api_key_here";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub youtube: YoutubeConfig,
    pub relay: RelayConfig,
    pub playlists: Vec<PlaylistConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            youtube: YoutubeConfig::default(),
            relay: RelayConfig::default(),
            playlists: default_playlists(),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration strictly: the file must exist and parse.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Overlay settings taken from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_api_key(std::env::var(API_KEY_ENV).ok());
    }

    /// Overlay an API key value; blank or placeholder values are ignored.
    pub fn apply_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()) {
            if !key.is_empty() && key != API_KEY_PLACEHOLDER {
                self.youtube.api_key = Some(key);
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.youtube.api_key().is_none() {
            warnings.push(format!(
                "youtube.api_key is not set ({API_KEY_ENV}); search and video info are disabled"
            ));
        }

        if !self.server.media_dir.is_dir() {
            warnings.push(format!(
                "server.media_dir {} is not a directory",
                self.server.media_dir.display()
            ));
        }

        if self.youtube.cache_ttl_secs == 0 {
            warnings.push("youtube.cache_ttl_secs is 0; every resolve will miss".into());
        }

        if self.relay.request_timeout_secs == 0 {
            warnings.push("relay.request_timeout_secs is 0".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the single-page player UI.
    pub static_dir: Option<PathBuf>,
    /// Directory that local audio files are served from.
    pub media_dir: PathBuf,
    /// File streamed by `GET /stream` when no name is given.
    pub default_track: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            static_dir: Some(PathBuf::from("./static")),
            media_dir: PathBuf::from("."),
            default_track: "Armadham.mp3".into(),
        }
    }
}

/// YouTube search and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// YouTube Data API v3 key. Only search and video info need it.
    pub api_key: Option<String>,
    pub api_base_url: String,
    /// Prefix that an identifier is appended to for extraction.
    pub watch_base_url: String,
    pub cache_ttl_secs: u64,
    /// Explicit path to the yt-dlp binary; looked up on `PATH` when unset.
    pub ytdlp_path: Option<PathBuf>,
}

impl YoutubeConfig {
    /// The configured API key, treating blanks as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != API_KEY_PLACEHOLDER)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".into(),
            watch_base_url: "https://www.youtube.com/watch?v=".into(),
            cache_ttl_secs: 3600,
            ytdlp_path: None,
        }
    }
}

/// Outbound media relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub user_agent: String,
    pub referer: String,
    /// Content type advertised when the metadata probe fails.
    pub default_content_type: String,
}

impl RelayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            probe_timeout_secs: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .into(),
            referer: "https://www.youtube.com/".into(),
            default_content_type: "audio/mpeg".into(),
        }
    }
}

/// Entry in the static playlist listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistConfig {
    pub id: String,
    pub name: String,
    pub count: u32,
}

fn default_playlists() -> Vec<PlaylistConfig> {
    [("favorites", "Favorites", 12), ("chill", "Chill Vibes", 8), ("workout", "Workout Mix", 15)]
        .into_iter()
        .map(|(id, name, count)| PlaylistConfig {
            id: id.into(),
            name: name.into(),
            count,
        })
        .collect()
}
