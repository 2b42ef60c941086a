//! Adapter layer: Convert MusicBrainz DTOs to domain records
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! If MusicBrainz changes their response format, only this file and
//! dto.rs need to change.

use chrono::NaiveDate;

use super::dto;
use crate::model::{AlbumRecord, ArtistRecord, MemberRecord, Provenance, ProviderId, TrackRecord};

/// Convert an artist lookup response into a domain record.
pub fn to_artist(response: dto::ArtistResponse) -> ArtistRecord {
    let mut record = ArtistRecord {
        name: response.name,
        mbid: Some(response.id),
        country_code: response.country,
        provenance: Provenance::Provider(ProviderId::MusicBrainz),
        ..Default::default()
    };

    if let Some(life_span) = &response.life_span {
        record.begin_year = life_span.begin.as_deref().and_then(parse_year);
        record.end_year = life_span.end.as_deref().and_then(parse_year);
        record.disbanded = life_span.ended == Some(true);
    }

    record.members = extract_members(&response.relations);
    apply_url_relations(&response.relations, &mut record);

    record
}

/// Convert a release lookup response into a domain record.
pub fn to_album(response: dto::ReleaseResponse) -> AlbumRecord {
    let artist = build_artist_string(&response.artist_credit);
    let artist_mbid = response.artist_credit.first().map(|c| c.artist.id.clone());

    let release_format = response.media.first().and_then(|m| m.format.clone());
    let label = response
        .label_info
        .first()
        .and_then(|li| li.label.as_ref())
        .map(|l| l.name.clone());
    let genre = response.genres.first().map(|g| g.name.clone());

    // Prefer the release group's first release date (the original album
    // date) over this particular edition's date.
    let release_date = response
        .release_group
        .as_ref()
        .and_then(|rg| rg.first_release_date.as_deref())
        .and_then(parse_date)
        .or_else(|| response.date.as_deref().and_then(parse_date));

    AlbumRecord {
        name: response.title,
        artist,
        mbid: Some(response.id),
        release_group_mbid: response.release_group.as_ref().map(|rg| rg.id.clone()),
        artist_mbid,
        year: response.date.as_deref().and_then(|d| d.get(..4)).map(String::from),
        genre,
        label,
        release_format,
        allmusic_id: url_relation(&response.relations, "allmusic"),
        amazon_id: url_relation(&response.relations, "amazon"),
        discogs_id: url_relation(&response.relations, "discogs"),
        genius_id: url_relation(&response.relations, "genius"),
        wikipedia_id: url_relation(&response.relations, "wikipedia"),
        wikidata_id: url_relation(&response.relations, "wikidata"),
        lastfm: url_relation(&response.relations, "last.fm"),
        release_date,
        tracks: extract_tracks(&response.media),
        provenance: Provenance::Provider(ProviderId::MusicBrainz),
        ..Default::default()
    }
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        if let Some(join) = &credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

/// Current band members: artist relations whose type mentions "member"
/// and that have not ended.
fn extract_members(relations: &[dto::Relation]) -> Vec<MemberRecord> {
    relations
        .iter()
        .filter(|r| {
            r.target_type.as_deref() == Some("artist")
                && r.rel_type.contains("member")
                && r.ended != Some(true)
        })
        .filter_map(|r| r.artist.as_ref())
        .map(|a| MemberRecord {
            name: a.name.clone(),
            mbid: a.id.clone(),
        })
        .collect()
}

/// Map url relations onto the artist's link fields.
///
/// Directly-typed relations ("discogs", "official homepage", ...) map
/// one-to-one; the generic "social network" type is disambiguated by
/// sniffing the URL's host.
fn apply_url_relations(relations: &[dto::Relation], record: &mut ArtistRecord) {
    record.website = url_relation(relations, "official homepage");
    record.bandsintown = url_relation(relations, "bandsintown");
    record.discogs = url_relation(relations, "discogs");
    record.imdb = url_relation(relations, "IMDb");
    record.lastfm = url_relation(relations, "last.fm");
    record.songkick = url_relation(relations, "songkick");
    record.soundcloud = url_relation(relations, "soundcloud");
    record.youtube = url_relation(relations, "youtube");
    record.allmusic = url_relation(relations, "allmusic");

    for relation in relations.iter().filter(|r| r.rel_type == "social network") {
        let Some(url) = relation.url.as_ref().map(|u| u.resource.clone()) else {
            continue;
        };

        let lower = url.to_lowercase();
        if lower.contains("wikipedia.org") {
            record.wikipedia.get_or_insert(url);
        } else if lower.contains("facebook.com") {
            record.facebook.get_or_insert(url);
        } else if lower.contains("twitter.com") {
            record.twitter.get_or_insert(url);
        } else if lower.contains("instagram.com") {
            record.instagram.get_or_insert(url);
        } else if lower.contains("flickr.com") {
            record.flickr.get_or_insert(url);
        } else if lower.contains("tiktok.com") {
            record.tiktok.get_or_insert(url);
        } else if lower.contains("threads.com") || lower.contains("threads.net") {
            record.threads.get_or_insert(url);
        }
    }
}

/// First url relation of the given type.
fn url_relation(relations: &[dto::Relation], rel_type: &str) -> Option<String> {
    relations
        .iter()
        .find(|r| r.rel_type == rel_type)
        .and_then(|r| r.url.as_ref())
        .map(|u| u.resource.clone())
}

/// Flatten all media into one 1-based track list.
fn extract_tracks(media: &[dto::Medium]) -> Vec<TrackRecord> {
    let mut position = 0u32;
    media
        .iter()
        .flat_map(|m| m.tracks.iter())
        .map(|t| {
            position += 1;
            TrackRecord {
                name: t.title.clone().unwrap_or_default(),
                position: t.position.unwrap_or(position),
                duration: t.length.map(|ms| (ms / 1000) as u32),
            }
        })
        .collect()
}

/// First four characters of a MusicBrainz date, as a year.
fn parse_year(value: &str) -> Option<i32> {
    value.get(..4).and_then(|y| y.parse().ok())
}

/// Full YYYY-MM-DD dates only; partial dates ("1969", "1969-09") carry
/// too little information for a date field and are dropped.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
