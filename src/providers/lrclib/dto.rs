//! LrcLib API Data Transfer Objects
//!
//! API Reference: https://lrclib.net/docs

use serde::{Deserialize, Serialize};

/// One lyrics entry, returned directly by `/api/get` and as array
/// elements by `/api/search`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsResponse {
    pub id: u64,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_name: String,
    /// Seconds, fractional
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub instrumental: bool,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}
