//! Fanart.tv API Data Transfer Objects
//!
//! These types match what the Fanart.tv music endpoints return. Image
//! lists carry a `likes` count (as a string) used for ranking.
//!
//! API Reference: https://fanart.tv/api-docs/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Artist images response (`/music/{artist-mbid}`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistImagesRoot {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artistbackground: Vec<FanartImage>,
    #[serde(default)]
    pub artistthumb: Vec<FanartImage>,
    #[serde(default)]
    pub musicbanner: Vec<FanartImage>,
    #[serde(default)]
    pub musiclogo: Vec<FanartImage>,
}

/// Album images response (`/music/albums/{release-group-mbid}`); covers
/// are nested under the release-group id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlbumImagesRoot {
    #[serde(default)]
    pub albums: HashMap<String, AlbumImages>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlbumImages {
    #[serde(default)]
    pub albumcover: Vec<FanartImage>,
}

/// One image with its community vote count.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanartImage {
    pub url: String,
    /// Vote count, returned as a string by the API.
    #[serde(default)]
    pub likes: String,
}

impl FanartImage {
    pub fn likes(&self) -> u32 {
        self.likes.parse().unwrap_or(0)
    }
}
