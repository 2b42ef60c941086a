//! Cover Art Archive API Data Transfer Objects
//!
//! API Reference: https://musicbrainz.org/doc/Cover_Art_Archive/API

use serde::{Deserialize, Serialize};

/// Release images response (`/release/{mbid}`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReleaseImagesResponse {
    #[serde(default)]
    pub images: Vec<CoverImage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverImage {
    /// Full-size image URL
    pub image: String,
    #[serde(default)]
    pub front: bool,
    #[serde(default)]
    pub approved: bool,
}
