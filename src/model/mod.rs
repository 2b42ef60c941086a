//! Domain records for aggregated music metadata.
//!
//! These types are OUR types - they don't change when provider APIs change.
//! Provider responses get converted into these records via each provider's
//! adapter, and the aggregation engine merges them field by field.
//!
//! Records are stored in the cache as JSON payloads, so everything here
//! derives `Serialize`/`Deserialize`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one upstream metadata source.
///
/// Used as the rate-limit configuration key and in [`Provenance`] tags,
/// so the variant names double as stable config/display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    MusicBrainz,
    LastFm,
    Fanart,
    CoverArt,
    LrcLib,
    LyricsOvh,
}

impl ProviderId {
    /// Lowercase name used in config files and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::MusicBrainz => "musicbrainz",
            ProviderId::LastFm => "lastfm",
            ProviderId::Fanart => "fanart",
            ProviderId::CoverArt => "coverart",
            ProviderId::LrcLib => "lrclib",
            ProviderId::LyricsOvh => "lyricsovh",
        }
    }

    /// Parse a config-file provider name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "musicbrainz" => Some(ProviderId::MusicBrainz),
            "lastfm" => Some(ProviderId::LastFm),
            "fanart" => Some(ProviderId::Fanart),
            "coverart" => Some(ProviderId::CoverArt),
            "lrclib" => Some(ProviderId::LrcLib),
            "lyricsovh" => Some(ProviderId::LyricsOvh),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record's data originated.
///
/// Set once when the record is constructed and never mutated afterward:
/// cache hits construct a fresh `Cache`-tagged copy, and the `NotFound`
/// sentinel stays distinguishable from a legitimately empty record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Served from the local cache.
    Cache,
    /// Merged from two or more providers.
    #[default]
    Aggregated,
    /// Exactly one provider contributed.
    Provider(ProviderId),
    /// Negative-cache sentinel: aggregation found nothing for this key.
    NotFound,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Cache => f.write_str("cache"),
            Provenance::Aggregated => f.write_str("aggregated"),
            Provenance::Provider(id) => f.write_str(id.as_str()),
            Provenance::NotFound => f.write_str("not-found"),
        }
    }
}

/// A band member or collaborator, keyed by MusicBrainz artist id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub mbid: String,
}

/// Aggregated artist metadata.
///
/// `name` is the fallback lookup key (case-insensitive); `mbid` is the
/// canonical cross-provider key when present. Everything else is optional
/// and filled in by whichever providers answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub name: String,
    pub mbid: Option<String>,
    pub biography: Option<String>,
    pub country_code: Option<String>,
    pub website: Option<String>,
    pub wikipedia: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub flickr: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub threads: Option<String>,
    pub allmusic: Option<String>,
    pub lastfm: Option<String>,
    pub discogs: Option<String>,
    pub bandsintown: Option<String>,
    pub songkick: Option<String>,
    pub soundcloud: Option<String>,
    pub imdb: Option<String>,
    pub youtube: Option<String>,
    pub audiodb_id: Option<String>,
    pub picture_url: Option<String>,
    pub banner_url: Option<String>,
    pub logo_url: Option<String>,
    pub fanart_url: Option<String>,
    pub fanart2_url: Option<String>,
    pub fanart3_url: Option<String>,
    pub fanart4_url: Option<String>,
    pub fanart5_url: Option<String>,
    pub begin_year: Option<i32>,
    pub end_year: Option<i32>,
    pub disbanded: bool,
    pub members: Vec<MemberRecord>,
    pub provenance: Provenance,
}

impl ArtistRecord {
    /// Negative-cache sentinel for a name no provider could answer.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provenance: Provenance::NotFound,
            ..Default::default()
        }
    }
}

/// A single track on an album, as reported by one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub name: String,
    /// 1-based position within the release.
    pub position: u32,
    /// Duration in seconds.
    pub duration: Option<u32>,
}

/// Aggregated album (release) metadata.
///
/// `mbid` is the MusicBrainz release id; `release_group_mbid` groups the
/// same album across editions and is what image providers key on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub name: String,
    pub artist: Option<String>,
    pub mbid: Option<String>,
    pub release_group_mbid: Option<String>,
    pub artist_mbid: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub label: Option<String>,
    pub release_format: Option<String>,
    pub biography: Option<String>,
    pub wikipedia: Option<String>,
    pub wikipedia_id: Option<String>,
    pub wikidata_id: Option<String>,
    pub allmusic_id: Option<String>,
    pub amazon_id: Option<String>,
    pub discogs_id: Option<String>,
    pub genius_id: Option<String>,
    pub lyricwiki_id: Option<String>,
    pub musicmoz_id: Option<String>,
    pub audiodb_id: Option<String>,
    pub audiodb_artist_id: Option<String>,
    pub lastfm: Option<String>,
    pub picture_url: Option<String>,
    pub sales: Option<String>,
    pub score: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub tracks: Vec<TrackRecord>,
    pub provenance: Provenance,
}

impl AlbumRecord {
    /// Negative-cache sentinel for an album no provider could answer.
    pub fn not_found(name: impl Into<String>, artist_mbid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist_mbid: Some(artist_mbid.into()),
            provenance: Provenance::NotFound,
            ..Default::default()
        }
    }
}

/// Aggregated song lyrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsRecord {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
    /// Track duration in seconds.
    pub duration: Option<u32>,
    pub provenance: Provenance,
}

impl LyricsRecord {
    /// Negative-cache sentinel for a title/artist no provider could answer.
    pub fn not_found(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            provenance: Provenance::NotFound,
            ..Default::default()
        }
    }
}

/// The pair of MusicBrainz ids that identify a concrete release.
///
/// Produced by identity resolution; the release-group id is optional
/// because not every search hit carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIds {
    pub release_mbid: String,
    pub release_group_mbid: Option<String>,
}
