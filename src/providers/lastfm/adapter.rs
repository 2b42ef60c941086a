//! Adapter layer: Convert Last.fm DTOs to domain records.

use super::dto;
use crate::model::{AlbumRecord, ArtistRecord, Provenance, ProviderId, TrackRecord};

pub fn to_artist(artist: dto::Artist) -> ArtistRecord {
    let picture_url = pick_image(&artist.image);

    ArtistRecord {
        name: artist.name,
        mbid: none_if_empty(artist.mbid),
        lastfm: none_if_empty(artist.url),
        biography: artist.bio.and_then(|b| none_if_empty(b.content)),
        picture_url,
        provenance: Provenance::Provider(ProviderId::LastFm),
        ..Default::default()
    }
}

pub fn to_album(album: dto::Album) -> AlbumRecord {
    let picture_url = pick_image(&album.image);
    let tracks = album
        .tracks
        .map(|t| extract_tracks(t.track))
        .unwrap_or_default();

    AlbumRecord {
        name: album.name,
        artist: none_if_empty(album.artist),
        mbid: none_if_empty(album.mbid),
        lastfm: none_if_empty(album.url),
        picture_url,
        tracks,
        provenance: Provenance::Provider(ProviderId::LastFm),
        ..Default::default()
    }
}

/// Largest useful image: extralarge, then mega, then the unsized entry.
fn pick_image(images: &[dto::Image]) -> Option<String> {
    ["extralarge", "mega", ""]
        .iter()
        .find_map(|size| images.iter().find(|i| i.size == *size))
        .map(|i| i.url.clone())
        .filter(|url| !url.is_empty())
}

fn extract_tracks(tracks: Vec<dto::Track>) -> Vec<TrackRecord> {
    tracks
        .into_iter()
        .enumerate()
        .map(|(i, t)| TrackRecord {
            position: t.attr.map(|a| a.rank).unwrap_or(i as u32 + 1),
            name: t.name,
            duration: t.duration,
        })
        .collect()
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, size: &str) -> dto::Image {
        dto::Image {
            url: url.to_string(),
            size: size.to_string(),
        }
    }

    #[test]
    fn test_artist_mapping() {
        let artist = dto::Artist {
            name: "Cher".to_string(),
            mbid: "mbid-1".to_string(),
            url: "https://www.last.fm/music/Cher".to_string(),
            image: vec![
                image("small.png", "small"),
                image("xl.png", "extralarge"),
            ],
            bio: Some(dto::Biography {
                content: "Cher is an American singer...".to_string(),
            }),
        };

        let record = to_artist(artist);

        assert_eq!(record.name, "Cher");
        assert_eq!(record.mbid.as_deref(), Some("mbid-1"));
        assert_eq!(record.lastfm.as_deref(), Some("https://www.last.fm/music/Cher"));
        assert_eq!(record.picture_url.as_deref(), Some("xl.png"));
        assert_eq!(record.provenance, Provenance::Provider(ProviderId::LastFm));
    }

    #[test]
    fn test_empty_strings_become_none() {
        let artist = dto::Artist {
            name: "Unknown".to_string(),
            mbid: String::new(),
            url: String::new(),
            image: vec![],
            bio: Some(dto::Biography {
                content: String::new(),
            }),
        };

        let record = to_artist(artist);

        assert!(record.mbid.is_none());
        assert!(record.lastfm.is_none());
        assert!(record.biography.is_none());
        assert!(record.picture_url.is_none());
    }

    #[test]
    fn test_album_track_positions_from_rank() {
        let album = dto::Album {
            name: "Believe".to_string(),
            artist: "Cher".to_string(),
            mbid: "album-mbid".to_string(),
            url: String::new(),
            image: vec![],
            tracks: Some(dto::Tracks {
                track: vec![
                    dto::Track {
                        name: "Believe".to_string(),
                        duration: Some(239),
                        attr: Some(dto::TrackAttr { rank: 1 }),
                    },
                    dto::Track {
                        name: "The Power".to_string(),
                        duration: None,
                        attr: None,
                    },
                ],
            }),
        };

        let record = to_album(album);

        assert_eq!(record.tracks.len(), 2);
        assert_eq!(record.tracks[0].position, 1);
        assert_eq!(record.tracks[0].duration, Some(239));
        // Missing rank falls back to list order.
        assert_eq!(record.tracks[1].position, 2);
    }
}
