//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-data\config.toml
//! - macOS: ~/Library/Application Support/music-data/config.toml
//! - Linux: ~/.config/music-data/config.toml
//!
//! The file is human-readable and editable. Settings are loaded at
//! startup; a missing or unparseable file falls back to defaults so the
//! service always starts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Cache database settings
    pub cache: CacheConfig,

    /// Per-provider settings and priority order
    pub providers: ProvidersConfig,

    /// Provider name -> token bucket size. Providers without an entry get
    /// a conservative 1-request-per-second bucket.
    pub rate_limits: HashMap<String, RateLimit>,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Last.fm API key
    pub lastfm_api_key: Option<String>,

    /// Fanart.tv API key
    pub fanart_api_key: Option<String>,
}

/// Cache database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Path to the SQLite cache file (default: music_data.db in the
    /// current directory)
    pub db_path: Option<PathBuf>,

    /// Negative-cache TTL in seconds. When set, a query that no provider
    /// could answer writes a not-found sentinel; within the TTL the same
    /// key answers "not found" without contacting any provider, and an
    /// expired sentinel is treated as a miss. Unset disables negative
    /// caching entirely.
    pub negative_ttl_secs: Option<u64>,
}

/// Token bucket sizing for one provider: `max_requests` per `per_seconds`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimit {
    pub max_requests: u32,
    pub per_seconds: u64,
}

/// Per-provider settings and the fan-out priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Metadata provider priority order. Merge precedence follows this
    /// order regardless of which provider answers first.
    pub order: Vec<String>,

    /// Lyrics provider priority order.
    pub lyrics_order: Vec<String>,

    pub musicbrainz: ProviderSettings,
    pub lastfm: ProviderSettings,
    pub fanart: ProviderSettings,
    pub coverart: ProviderSettings,
    pub lrclib: ProviderSettings,
    pub lyricsovh: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: vec![
                "musicbrainz".to_string(),
                "lastfm".to_string(),
                "fanart".to_string(),
                "coverart".to_string(),
            ],
            lyrics_order: vec!["lrclib".to_string(), "lyricsovh".to_string()],
            // MusicBrainz asks for at most one request in flight
            musicbrainz: ProviderSettings {
                max_concurrency: 1,
                ..Default::default()
            },
            lastfm: ProviderSettings::default(),
            fanart: ProviderSettings::default(),
            coverart: ProviderSettings::default(),
            lrclib: ProviderSettings::default(),
            lyricsovh: ProviderSettings::default(),
        }
    }
}

/// Settings shared by every provider gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Disabled providers are skipped silently during fan-out.
    pub enabled: bool,

    /// Override the provider's default API base URL.
    pub base_url: Option<String>,

    /// Maximum concurrent in-flight calls to this provider.
    pub max_concurrency: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            max_concurrency: 5,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-data"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific path (used by the `--config` flag).
pub fn load_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    // Ensure directory exists
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
