//! Last.fm API Data Transfer Objects
//!
//! These types match EXACTLY what the Last.fm API returns for
//! `artist.getinfo` and `album.getinfo` (format=json).
//! DO NOT use these types outside the lastfm module - convert to domain
//! records via the adapter.
//!
//! API Reference: https://www.last.fm/api

use serde::{Deserialize, Serialize};

/// `artist.getinfo` envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRoot {
    pub artist: Artist,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub mbid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
    pub bio: Option<Biography>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Biography {
    #[serde(default)]
    pub content: String,
}

/// `album.getinfo` envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumRoot {
    pub album: Album,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub mbid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
    pub tracks: Option<Tracks>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tracks {
    #[serde(default)]
    pub track: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub name: String,
    pub duration: Option<u32>,
    #[serde(rename = "@attr")]
    pub attr: Option<TrackAttr>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackAttr {
    #[serde(default)]
    pub rank: u32,
}

/// Sized image; the URL lives under the `#text` key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    #[serde(rename = "#text", default)]
    pub url: String,
    #[serde(default)]
    pub size: String,
}
