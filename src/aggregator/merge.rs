//! Field-level merge policy.
//!
//! Inputs arrive already ordered by configured provider priority; every
//! rule below is "first wins" walking that order, so the outcome is
//! deterministic no matter which provider answered fastest.
//!
//! Rules:
//! - scalar text: first non-blank value
//! - numeric: first value greater than zero
//! - boolean: true if any provider says true
//! - date: first present value
//! - members: union de-duplicated by name, first occurrence kept
//! - track lists: first provider's complete non-empty list (track lists
//!   are internally consistent; mixing providers' numbering is not)
//!
//! Merging never fabricates values: a field no provider supplied stays
//! empty.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::{
    AlbumRecord, ArtistRecord, LyricsRecord, MemberRecord, Provenance, TrackRecord,
};

/// Merge artist partials ordered by provider priority.
///
/// Returns `None` for an empty input - no contributors means no record.
pub fn merge_artists(records: &[ArtistRecord]) -> Option<ArtistRecord> {
    if records.is_empty() {
        return None;
    }

    Some(ArtistRecord {
        name: first_name(records, |r| &r.name),
        mbid: first_text(records, |r| r.mbid.as_deref()),
        biography: first_text(records, |r| r.biography.as_deref()),
        country_code: first_text(records, |r| r.country_code.as_deref()),
        website: first_text(records, |r| r.website.as_deref()),
        wikipedia: first_text(records, |r| r.wikipedia.as_deref()),
        facebook: first_text(records, |r| r.facebook.as_deref()),
        twitter: first_text(records, |r| r.twitter.as_deref()),
        flickr: first_text(records, |r| r.flickr.as_deref()),
        instagram: first_text(records, |r| r.instagram.as_deref()),
        tiktok: first_text(records, |r| r.tiktok.as_deref()),
        threads: first_text(records, |r| r.threads.as_deref()),
        allmusic: first_text(records, |r| r.allmusic.as_deref()),
        lastfm: first_text(records, |r| r.lastfm.as_deref()),
        discogs: first_text(records, |r| r.discogs.as_deref()),
        bandsintown: first_text(records, |r| r.bandsintown.as_deref()),
        songkick: first_text(records, |r| r.songkick.as_deref()),
        soundcloud: first_text(records, |r| r.soundcloud.as_deref()),
        imdb: first_text(records, |r| r.imdb.as_deref()),
        youtube: first_text(records, |r| r.youtube.as_deref()),
        audiodb_id: first_text(records, |r| r.audiodb_id.as_deref()),
        picture_url: first_text(records, |r| r.picture_url.as_deref()),
        banner_url: first_text(records, |r| r.banner_url.as_deref()),
        logo_url: first_text(records, |r| r.logo_url.as_deref()),
        fanart_url: first_text(records, |r| r.fanart_url.as_deref()),
        fanart2_url: first_text(records, |r| r.fanart2_url.as_deref()),
        fanart3_url: first_text(records, |r| r.fanart3_url.as_deref()),
        fanart4_url: first_text(records, |r| r.fanart4_url.as_deref()),
        fanart5_url: first_text(records, |r| r.fanart5_url.as_deref()),
        begin_year: first_positive(records, |r| r.begin_year),
        end_year: first_positive(records, |r| r.end_year),
        disbanded: records.iter().any(|r| r.disbanded),
        members: union_members(records),
        provenance: merged_provenance(records.len(), || records[0].provenance),
    })
}

/// Merge album partials ordered by provider priority.
pub fn merge_albums(records: &[AlbumRecord]) -> Option<AlbumRecord> {
    if records.is_empty() {
        return None;
    }

    Some(AlbumRecord {
        name: first_name(records, |r| &r.name),
        artist: first_text(records, |r| r.artist.as_deref()),
        mbid: first_text(records, |r| r.mbid.as_deref()),
        release_group_mbid: first_text(records, |r| r.release_group_mbid.as_deref()),
        artist_mbid: first_text(records, |r| r.artist_mbid.as_deref()),
        year: first_text(records, |r| r.year.as_deref()),
        genre: first_text(records, |r| r.genre.as_deref()),
        label: first_text(records, |r| r.label.as_deref()),
        release_format: first_text(records, |r| r.release_format.as_deref()),
        biography: first_text(records, |r| r.biography.as_deref()),
        wikipedia: first_text(records, |r| r.wikipedia.as_deref()),
        wikipedia_id: first_text(records, |r| r.wikipedia_id.as_deref()),
        wikidata_id: first_text(records, |r| r.wikidata_id.as_deref()),
        allmusic_id: first_text(records, |r| r.allmusic_id.as_deref()),
        amazon_id: first_text(records, |r| r.amazon_id.as_deref()),
        discogs_id: first_text(records, |r| r.discogs_id.as_deref()),
        genius_id: first_text(records, |r| r.genius_id.as_deref()),
        lyricwiki_id: first_text(records, |r| r.lyricwiki_id.as_deref()),
        musicmoz_id: first_text(records, |r| r.musicmoz_id.as_deref()),
        audiodb_id: first_text(records, |r| r.audiodb_id.as_deref()),
        audiodb_artist_id: first_text(records, |r| r.audiodb_artist_id.as_deref()),
        lastfm: first_text(records, |r| r.lastfm.as_deref()),
        picture_url: first_text(records, |r| r.picture_url.as_deref()),
        sales: first_text(records, |r| r.sales.as_deref()),
        score: first_positive(records, |r| r.score),
        release_date: first_date(records, |r| r.release_date),
        tracks: first_track_list(records),
        provenance: merged_provenance(records.len(), || records[0].provenance),
    })
}

/// Merge lyrics partials ordered by provider priority.
pub fn merge_lyrics(records: &[LyricsRecord]) -> Option<LyricsRecord> {
    if records.is_empty() {
        return None;
    }

    Some(LyricsRecord {
        title: first_name(records, |r| &r.title),
        artist: first_name(records, |r| &r.artist),
        album: first_text(records, |r| r.album.as_deref()),
        plain_lyrics: first_text(records, |r| r.plain_lyrics.as_deref()),
        synced_lyrics: first_text(records, |r| r.synced_lyrics.as_deref()),
        duration: first_positive_u32(records, |r| r.duration),
        provenance: merged_provenance(records.len(), || records[0].provenance),
    })
}

/// A single contributor keeps its own tag; two or more become
/// `Aggregated`.
fn merged_provenance(contributors: usize, sole: impl FnOnce() -> Provenance) -> Provenance {
    if contributors == 1 {
        sole()
    } else {
        Provenance::Aggregated
    }
}

fn first_name<T>(records: &[T], get: impl Fn(&T) -> &str) -> String {
    records
        .iter()
        .map(|r| get(r))
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

fn first_text<T>(records: &[T], get: impl Fn(&T) -> Option<&str>) -> Option<String> {
    records
        .iter()
        .filter_map(|r| get(r))
        .find(|s| !s.trim().is_empty())
        .map(String::from)
}

fn first_positive<T>(records: &[T], get: impl Fn(&T) -> Option<i32>) -> Option<i32> {
    records.iter().filter_map(|r| get(r)).find(|v| *v > 0)
}

fn first_positive_u32<T>(records: &[T], get: impl Fn(&T) -> Option<u32>) -> Option<u32> {
    records.iter().filter_map(|r| get(r)).find(|v| *v > 0)
}

fn first_date<T>(records: &[T], get: impl Fn(&T) -> Option<NaiveDate>) -> Option<NaiveDate> {
    records.iter().find_map(|r| get(r))
}

/// Union of member lists, de-duplicated by (case-insensitive) name with
/// the first occurrence winning.
fn union_members(records: &[ArtistRecord]) -> Vec<MemberRecord> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for member in records.iter().flat_map(|r| r.members.iter()) {
        if seen.insert(member.name.to_lowercase()) {
            members.push(member.clone());
        }
    }
    members
}

/// First complete non-empty track list; track lists are taken wholesale,
/// never merged element by element.
fn first_track_list(records: &[AlbumRecord]) -> Vec<TrackRecord> {
    records
        .iter()
        .map(|r| &r.tracks)
        .find(|t| !t.is_empty())
        .cloned()
        .unwrap_or_default()
}
