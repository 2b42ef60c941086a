//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to
//! domain records via the adapter.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! We use four endpoints: /artist and /release search (identity
//! resolution) and /artist/{mbid}, /release/{mbid} lookups.

use serde::{Deserialize, Serialize};

/// Artist search response (`/artist?query=...`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub artists: Vec<SearchArtist>,
}

/// One artist search candidate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchArtist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Artist name
    pub name: String,
    /// Lucene match score, 0-100 (100 = perfect match)
    #[serde(default)]
    pub score: u32,
}

/// Release search response (`/release?query=...`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReleaseSearchResponse {
    #[serde(default)]
    pub releases: Vec<SearchRelease>,
}

/// One release search candidate
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchRelease {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Lucene match score, 0-100
    #[serde(default)]
    pub score: u32,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Release group reference
    pub release_group: Option<ReleaseGroupRef>,
}

/// Minimal release group reference carried by search hits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseGroupRef {
    pub id: String,
}

/// Artist lookup response (`/artist/{mbid}?inc=artist-rels+url-rels`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtistResponse {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// ISO country code
    pub country: Option<String>,
    /// Begin/end dates and the "ended" flag
    pub life_span: Option<LifeSpan>,
    /// Artist and URL relationships
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Artist life span
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifeSpan {
    /// Begin date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub begin: Option<String>,
    /// End date
    pub end: Option<String>,
    /// True for disbanded groups / deceased persons
    pub ended: Option<bool>,
}

/// A relationship attached to an artist or release
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Relation {
    /// Relationship type ("member of band", "official homepage",
    /// "social network", "discogs", ...)
    #[serde(rename = "type")]
    pub rel_type: String,
    /// What the relation points at ("artist", "url", ...)
    pub target_type: Option<String>,
    /// Whether the relationship has ended (former members)
    pub ended: Option<bool>,
    /// Target URL for url relations
    pub url: Option<UrlRef>,
    /// Target artist for artist relations
    pub artist: Option<ArtistRef>,
}

/// URL relation target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UrlRef {
    pub resource: String,
}

/// Artist relation target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// Release lookup response
/// (`/release/{mbid}?inc=artist-credits+labels+recordings+release-groups+url-rels+genres`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseResponse {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Release group (groups same album across editions)
    pub release_group: Option<ReleaseGroup>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Label info
    #[serde(default)]
    pub label_info: Vec<LabelInfo>,
    /// Genres with vote counts
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// URL relationships
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Media (discs) in this release
    #[serde(default)]
    pub media: Vec<Medium>,
}

/// Release group carried by release lookups
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    /// MusicBrainz release group ID
    pub id: String,
    /// First release date across all editions
    pub first_release_date: Option<String>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// How this artist is credited
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
    /// The artist
    pub artist: ArtistRef,
}

/// Label attribution
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelInfo {
    pub label: Option<LabelRef>,
}

/// Label reference
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelRef {
    pub name: String,
}

/// Genre tag with vote count
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Genre {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    /// Format (CD, Vinyl, Digital, etc.)
    pub format: Option<String>,
    /// Position in release (disc number)
    pub position: Option<u32>,
    /// Tracks on this medium
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    /// Track position on medium
    pub position: Option<u32>,
    /// Track title
    pub title: Option<String>,
    /// Track length in milliseconds
    pub length: Option<u64>,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_artist_search() {
        let json = r#"{
            "created": "2024-01-01T00:00:00.000Z",
            "count": 2,
            "offset": 0,
            "artists": [
                {"id": "b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d", "score": 100, "name": "The Beatles"},
                {"id": "other-id", "score": 80, "name": "The Beatles Revival"}
            ]
        }"#;

        let response: ArtistSearchResponse =
            serde_json::from_str(json).expect("Should parse artist search");

        assert_eq!(response.artists.len(), 2);
        assert_eq!(response.artists[0].score, 100);
        assert_eq!(response.artists[1].name, "The Beatles Revival");
    }

    #[test]
    fn test_parse_release_search() {
        let json = r#"{
            "releases": [{
                "id": "rel-1",
                "title": "Abbey Road",
                "score": 100,
                "date": "1969-09-26",
                "release-group": {"id": "rg-1"}
            }, {
                "id": "rel-2",
                "title": "Abbey Road",
                "score": 100
            }]
        }"#;

        let response: ReleaseSearchResponse =
            serde_json::from_str(json).expect("Should parse release search");

        assert_eq!(response.releases.len(), 2);
        assert_eq!(response.releases[0].date.as_deref(), Some("1969-09-26"));
        assert_eq!(response.releases[0].release_group.as_ref().unwrap().id, "rg-1");
        // Search hits without a date or release-group still parse.
        assert!(response.releases[1].date.is_none());
        assert!(response.releases[1].release_group.is_none());
    }

    #[test]
    fn test_parse_artist_lookup_with_relations() {
        let json = r#"{
            "id": "art-1",
            "name": "Queen",
            "country": "GB",
            "life-span": {"begin": "1970", "end": null, "ended": false},
            "relations": [
                {
                    "type": "member of band",
                    "target-type": "artist",
                    "ended": false,
                    "artist": {"id": "fm-1", "name": "Brian May"}
                },
                {
                    "type": "official homepage",
                    "target-type": "url",
                    "url": {"resource": "http://www.queenonline.com/"}
                },
                {
                    "type": "social network",
                    "target-type": "url",
                    "url": {"resource": "https://twitter.com/QueenWillRock"}
                }
            ]
        }"#;

        let artist: ArtistResponse =
            serde_json::from_str(json).expect("Should parse artist lookup");

        assert_eq!(artist.name, "Queen");
        assert_eq!(artist.country.as_deref(), Some("GB"));
        assert_eq!(artist.life_span.as_ref().unwrap().begin.as_deref(), Some("1970"));
        assert_eq!(artist.relations.len(), 3);
        assert_eq!(artist.relations[0].artist.as_ref().unwrap().name, "Brian May");
        assert_eq!(
            artist.relations[1].url.as_ref().unwrap().resource,
            "http://www.queenonline.com/"
        );
    }

    #[test]
    fn test_parse_release_lookup() {
        let json = r#"{
            "id": "rel-1",
            "title": "Abbey Road",
            "date": "1969-09-26",
            "release-group": {"id": "rg-1", "first-release-date": "1969-09-26"},
            "artist-credit": [{
                "name": "The Beatles",
                "joinphrase": "",
                "artist": {"id": "art-1", "name": "The Beatles"}
            }],
            "label-info": [{"label": {"name": "Apple Records"}}],
            "genres": [{"name": "rock", "count": 10}],
            "relations": [{
                "type": "discogs",
                "target-type": "url",
                "url": {"resource": "https://www.discogs.com/master/24047"}
            }],
            "media": [{
                "format": "CD",
                "position": 1,
                "tracks": [
                    {"position": 1, "title": "Come Together", "length": 259000},
                    {"position": 2, "title": "Something", "length": 182000}
                ]
            }]
        }"#;

        let release: ReleaseResponse =
            serde_json::from_str(json).expect("Should parse release lookup");

        assert_eq!(release.title, "Abbey Road");
        assert_eq!(
            release.release_group.as_ref().unwrap().first_release_date.as_deref(),
            Some("1969-09-26")
        );
        assert_eq!(release.label_info[0].label.as_ref().unwrap().name, "Apple Records");
        assert_eq!(release.genres[0].name, "rock");
        assert_eq!(release.media[0].tracks.len(), 2);
        assert_eq!(release.media[0].tracks[1].length, Some(182000));
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": "Not Found",
            "help": "For usage, please see: https://musicbrainz.org/doc/MusicBrainz_API"
        }"#;

        let error: ApiError = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(error.error, "Not Found");
        assert!(error.help.is_some());
    }
}
